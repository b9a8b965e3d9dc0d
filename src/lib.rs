pub mod client;
pub mod config;
pub mod error;
pub mod listing;
pub mod middleware;
pub mod mock;
pub mod models;
pub mod state;
pub mod store;
pub mod views;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::client::{HttpUsersApi, Session};
use crate::config::Config;
use crate::middleware::auth_redirect::force_logout_on_unauthorized;
use crate::mock::MockApi;
use crate::state::{AppState, SharedState};
use crate::store::UserStore;

/// Wire the session, remote client, store and optional mock API into a router.
pub fn build_app(config: Config) -> Result<(Router, SharedState), String> {
    let session = Arc::new(match &config.session_file {
        Some(path) => Session::persistent(path),
        None => Session::in_memory(),
    });

    let api = HttpUsersApi::new(&config.api_url, session, config.request_timeout)?;
    let store = Arc::new(UserStore::new(Arc::new(api)));

    let mock = match &config.mock_api {
        Some(mock_config) => {
            tracing::info!("Serving the development users API under /api/v1");
            Some(MockApi::new(mock_config)?)
        }
        None => None,
    };

    let state: SharedState = Arc::new(AppState {
        config,
        store,
        mock,
    });

    Ok((build_router(state.clone()), state))
}

pub fn build_router(state: SharedState) -> Router {
    let mut app = Router::new();
    if state.mock.is_some() {
        app = app.merge(mock::mock_routes());
    }

    app.merge(views::view_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        force_logout_on_unauthorized,
    )))
    .route("/health", axum::routing::get(health))
    .layer(TraceLayer::new_for_http())
    .layer(SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    ))
    .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
