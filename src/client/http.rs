use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Session, UsersApi};
use crate::error::ClientError;
use crate::listing::{ListParams, query};
use crate::models::{
    CreateUserRequest, CreateUserResponse, CurrentUserResponse, LoginRequest, LoginResponse,
    UserRecord, UsersPage, UsersResponse,
};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

const NO_TOKEN: &str = "No authentication token found. Please login first.";
const AUTH_FAILED: &str = "Authentication failed. Please login again.";

/// `UsersApi` over HTTP with bearer-token auth.
pub struct HttpUsersApi {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl HttpUsersApi {
    pub fn new(base_url: &str, session: Arc<Session>, timeout: Duration) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<String, ClientError> {
        self.session
            .token()
            .ok_or_else(|| ClientError::Auth(NO_TOKEN.to_string()))
    }

    /// Map a non-2xx answer to an error, dropping the session on 401.
    async fn check(&self, resp: Response, read_message: bool) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Users API rejected the session token; clearing it");
            self.session.clear();
            return Err(ClientError::Auth(AUTH_FAILED.to_string()));
        }

        let fallback = format!("HTTP error! status: {}", status.as_u16());
        if !read_message {
            return Err(ClientError::Network(fallback));
        }

        let message = resp
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .or_else(|| body.get("error"))
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(|m| m.to_string())
            })
            .unwrap_or(fallback);
        Err(ClientError::Network(message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let token = self.token()?;
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        let resp = self.check(resp, false).await?;
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl UsersApi for HttpUsersApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let resp = self
            .client
            .post(self.url("/auth/login/"))
            .json(credentials)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Network(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        let body: LoginResponse = resp.json().await?;
        if body.status == "success" && !body.token.is_empty() {
            self.session.set_token(&body.token);
            tracing::info!("Signed in as {}", credentials.email);
        }
        Ok(body)
    }

    fn logout(&self) {
        self.session.clear();
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    async fn fetch_current_user(&self) -> Result<UserRecord, ClientError> {
        tracing::debug!("Fetching current user");
        let body: CurrentUserResponse = self.get_json("/users/me").await?;
        Ok(body.data)
    }

    async fn fetch_users(&self, params: &ListParams) -> Result<UsersPage, ClientError> {
        let query = query::encode_remote(params.sorting.as_ref(), &params.filters);
        let path = if query.is_empty() {
            "/users/".to_string()
        } else {
            format!("/users/?{query}")
        };
        tracing::debug!("Fetching users: {path}");
        let body: UsersResponse = self.get_json(&path).await?;
        Ok(body.data)
    }

    async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> Result<Option<UserRecord>, ClientError> {
        let token = self.token()?;

        // Confirm the session is still good before submitting the form.
        self.fetch_current_user()
            .await
            .map_err(|_| ClientError::Auth(AUTH_FAILED.to_string()))?;

        let resp = self
            .client
            .post(self.url("/users"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        let resp = self.check(resp, true).await?;
        let body: CreateUserResponse = resp.json().await?;
        Ok(body.data)
    }
}
