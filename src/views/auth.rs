use askama::Template;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::models::LoginRequest;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    email: String,
    error: Option<String>,
    notice: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub expired: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login_page(
    State(state): State<SharedState>,
    Query(q): Query<LoginQuery>,
) -> Response {
    if state.store.api().is_authenticated() {
        return Redirect::to("/dashboard").into_response();
    }

    let template = LoginTemplate {
        email: String::new(),
        error: None,
        notice: q
            .expired
            .map(|_| "Your session has ended. Please sign in again.".to_string()),
    };
    Html(template.render().unwrap_or_default()).into_response()
}

pub async fn login_submit(State(state): State<SharedState>, Form(form): Form<LoginForm>) -> Response {
    let credentials = LoginRequest {
        email: form.email.trim().to_string(),
        password: form.password,
    };

    if let Err(e) = state.store.login(&credentials).await {
        let template = LoginTemplate {
            email: credentials.email,
            error: Some(e.to_string()),
            notice: None,
        };
        return Html(template.render().unwrap_or_default()).into_response();
    }

    if let Err(e) = state.store.request_current_user().await {
        tracing::warn!("Signed in but could not load the current user: {e}");
    }
    Redirect::to("/dashboard").into_response()
}

pub async fn logout(State(state): State<SharedState>) -> Redirect {
    state.store.logout();
    Redirect::to("/auth/login")
}
