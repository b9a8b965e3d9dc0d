use axum::extract::{RawQuery, State};
use axum::Json;

use super::auth::ApiCaller;
use crate::error::AppError;
use crate::listing::{self, ListParams};
use crate::models::{
    CreateUserRequest, CreateUserResponse, CurrentUserResponse, LoginRequest, LoginResponse,
    UsersPage, UsersResponse,
};
use crate::state::SharedState;

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let mock = state.mock()?;

    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let stored = mock.directory.find_by_email(&req.email).ok_or_else(invalid)?;
    let hash = stored.password_hash.as_deref().ok_or_else(invalid)?;
    if !mock.credentials.password_matches(&req.password, hash) {
        tracing::warn!("Failed login for {}", req.email);
        return Err(invalid());
    }

    let token = mock
        .credentials
        .issue_token(&stored.record)
        .map_err(AppError::Internal)?;

    Ok(Json(LoginResponse {
        status: "success".to_string(),
        message: "Login successful".to_string(),
        token,
    }))
}

pub async fn me(
    caller: ApiCaller,
    State(state): State<SharedState>,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let mock = state.mock()?;
    let user = mock
        .directory
        .get(caller.user_id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(CurrentUserResponse {
        status: "success".to_string(),
        data: user,
    }))
}

/// Filtered, sorted users. Pages only when `page` or `limit` is given.
pub async fn list_users(
    _caller: ApiCaller,
    State(state): State<SharedState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<UsersResponse>, AppError> {
    let mock = state.mock()?;
    let raw = raw.unwrap_or_default();
    let params = ListParams::from_query(&raw);
    let paged = form_urlencoded::parse(raw.as_bytes()).any(|(k, _)| k == "page" || k == "limit");

    let shaped = listing::shape(&mock.directory.list(), &params);
    let total_count = shaped.len();

    let data = if paged {
        let page = params.pagination.page;
        let limit = params.pagination.limit;
        UsersPage {
            users: listing::paginate(&shaped, page, limit).to_vec(),
            total_count,
            current_page: page,
            total_pages: listing::total_pages(total_count, limit),
        }
    } else {
        UsersPage {
            users: shaped,
            total_count,
            current_page: 1,
            total_pages: usize::from(total_count > 0),
        }
    };

    Ok(Json(UsersResponse {
        status: "success".to_string(),
        data,
    }))
}

pub async fn create_user(
    caller: ApiCaller,
    State(state): State<SharedState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, AppError> {
    let mock = state.mock()?;

    req.validate().map_err(AppError::BadRequest)?;

    if mock.directory.find_by_email(&req.email).is_some() {
        return Err(AppError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    let pw_hash = mock
        .credentials
        .hash_password(&req.password)
        .map_err(AppError::Internal)?;
    let user = mock.directory.create(&req, pw_hash, caller.user_id);

    tracing::info!("{} created user {} ({})", caller.email, user.id, user.email);

    Ok(Json(CreateUserResponse {
        status: "success".to_string(),
        message: "User created successfully".to_string(),
        data: Some(user),
    }))
}
