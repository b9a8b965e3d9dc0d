use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::state::SharedState;

/// Turn a 401 from any dashboard page into a forced logout.
///
/// The store is reset and the browser lands on the login page with a notice
/// that the session ended.
pub async fn force_logout_on_unauthorized(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;
    if response.status() != StatusCode::UNAUTHORIZED {
        return response;
    }

    if state.store.snapshot().current_user.is_some() || state.store.api().is_authenticated() {
        tracing::info!("Session rejected; signing out of the dashboard");
    }
    state.store.logout();
    Redirect::to("/auth/login?expired=1").into_response()
}
