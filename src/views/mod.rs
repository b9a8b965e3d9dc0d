pub mod auth;
pub mod create;
pub mod users;

use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        // Auth views
        .route("/auth/login", get(auth::login_page).post(auth::login_submit))
        .route("/auth/logout", post(auth::logout))
        // Users listing
        .route("/dashboard", get(users::users_page))
        .route("/dashboard/rows/{id}/toggle", post(users::toggle_row))
        // User creation
        .route(
            "/dashboard/users/new",
            get(create::new_user_page),
        )
        .route("/dashboard/users", post(create::create_user_submit))
}

/// `/dashboard` carrying the store's current listing state.
pub fn dashboard_href(query: &str) -> String {
    if query.is_empty() {
        "/dashboard".to_string()
    } else {
        format!("/dashboard?{query}")
    }
}
