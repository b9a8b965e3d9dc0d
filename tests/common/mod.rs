#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use userdash::client::{HttpUsersApi, Session};
use userdash::config::{Config, MockApiConfig};
use userdash::models::UserRecord;
use userdash::state::SharedState;

pub const ADMIN_EMAIL: &str = "admin@test.com";
pub const ADMIN_PASSWORD: &str = "password123";

/// A running dashboard with the development users API mounted on itself.
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: SharedState,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn api_url(&self) -> String {
        self.url("/api/v1")
    }

    /// Login against the users API, return the body + status.
    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Login as the seeded admin and return the bearer token.
    pub async fn admin_token(&self) -> String {
        let (body, status) = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// A fresh remote client pointed at this app's users API.
    pub fn users_api(&self, session: Arc<Session>) -> HttpUsersApi {
        HttpUsersApi::new(&self.api_url(), session, Duration::from_secs(10))
            .expect("build users api client")
    }

    /// Sign the dashboard in through its login form.
    pub async fn dashboard_login(&self) {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)])
            .send()
            .await
            .expect("dashboard login failed");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/dashboard");
    }

    /// GET a dashboard page and return status + HTML.
    pub async fn page(&self, path: &str) -> (String, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("page request failed");
        let status = resp.status();
        (resp.text().await.unwrap_or_default(), status)
    }
}

pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_session(None).await
}

/// Spawn the app on a random port. The dashboard talks to its own mock API.
pub async fn spawn_app_with_session(session_file: Option<PathBuf>) -> TestApp {
    // Bind first so the API URL is known before the app is built.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    let config = Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        api_url: format!("http://{addr}/api/v1"),
        session_file,
        request_timeout: Duration::from_secs(10),
        log_level: "warn".to_string(),
        mock_api: Some(MockApiConfig {
            jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
            admin_email: ADMIN_EMAIL.to_string(),
            admin_password: ADMIN_PASSWORD.to_string(),
        }),
    };

    let (app, state) = userdash::build_app(config).expect("Failed to build app");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        state,
        client,
    }
}

/// A user record as the users API would send it.
pub fn user(
    id: i64,
    name: &str,
    user_type: &str,
    is_active: bool,
    created_by: Option<i64>,
    created_at: &str,
) -> UserRecord {
    let (first, last) = name.split_once(' ').unwrap_or((name, ""));
    serde_json::from_value(json!({
        "id": id,
        "userType": user_type,
        "firstName": first,
        "lastName": last,
        "email": format!("{}@example.com", first.to_lowercase()),
        "isActive": is_active,
        "createdBy": created_by,
        "createdAt": created_at,
        "updatedAt": created_at,
    }))
    .expect("valid user json")
}

pub fn ids(records: &[UserRecord]) -> Vec<i64> {
    records.iter().map(|u| u.id).collect()
}
