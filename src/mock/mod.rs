//! Development stand-in for the remote users API.

pub mod auth;
pub mod directory;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;

use crate::config::MockApiConfig;
use crate::state::SharedState;

pub use auth::Credentials;
pub use directory::Directory;

pub struct MockApi {
    pub directory: Directory,
    pub credentials: Credentials,
}

impl MockApi {
    pub fn new(config: &MockApiConfig) -> Result<Self, String> {
        let credentials = Credentials::new(&config.jwt_secret)?;
        let admin_hash = credentials.hash_password(&config.admin_password)?;
        Ok(Self {
            directory: Directory::seeded(&config.admin_email, admin_hash),
            credentials,
        })
    }
}

pub fn mock_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/auth/login", post(handlers::login))
        .route("/api/v1/auth/login/", post(handlers::login))
        .route("/api/v1/users/me", get(handlers::me))
        .route(
            "/api/v1/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/v1/users/", get(handlers::list_users))
}
