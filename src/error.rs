use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "status": "error", "error": message });
        (status, axum::Json(body)).into_response()
    }
}

/// Failures seen by the users API client and surfaced through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Missing, invalid or expired session token.
    Auth(String),
    /// Transport failure or a non-2xx answer that is not an auth problem.
    Network(String),
    /// Local field checks that failed before anything was sent.
    Validation(String),
}

impl ClientError {
    pub fn message(&self) -> &str {
        match self {
            ClientError::Auth(msg) | ClientError::Network(msg) | ClientError::Validation(msg) => {
                msg
            }
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Network(format!("Unexpected response from users API: {err}"))
        } else {
            ClientError::Network(format!("Users API request failed: {err}"))
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Auth(msg) => AppError::Unauthorized(msg),
            ClientError::Validation(msg) => AppError::BadRequest(msg),
            ClientError::Network(msg) => AppError::Internal(msg),
        }
    }
}
