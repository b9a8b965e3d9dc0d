use askama::Template;
use axum::extract::{Path, RawQuery, State};
use axum::response::{Html, IntoResponse, Redirect};

use super::dashboard_href;
use crate::error::AppError;
use crate::listing::{query, ListParams, PageRequest, SortDirection, SortField, UserSorting};
use crate::models::UserRecord;
use crate::state::SharedState;
use crate::store::UsersState;

pub const USER_TYPES: [&str; 4] = ["admin", "manager", "staff", "viewer"];

#[derive(Template)]
#[template(path = "dashboard/users.html")]
struct UsersTemplate {
    user_name: String,
    rows: Vec<UserRow>,
    error: Option<String>,
    retry_href: String,
    search: String,
    user_type: String,
    user_types: Vec<&'static str>,
    is_active: String,
    columns: Vec<SortLink>,
    pager: Pager,
}

struct UserRow {
    id: i64,
    nested: bool,
    name: String,
    email: String,
    initials: String,
    avatar_url: String,
    /// Set on a root whose creator is listed elsewhere, e.g. on another page.
    created_by: Option<String>,
    user_type: String,
    is_active: bool,
    created_at: String,
    child_count: usize,
    expanded: bool,
    is_current: bool,
}

struct SortLink {
    label: &'static str,
    href: String,
    indicator: &'static str,
}

struct Pager {
    page: usize,
    total_pages: usize,
    total_items: usize,
    prev_href: Option<String>,
    next_href: Option<String>,
}

pub async fn users_page(
    State(state): State<SharedState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    let store = &state.store;
    if !store.api().is_authenticated() {
        return Err(AppError::Unauthorized("Please login first".to_string()));
    }

    let params = ListParams::from_query(&without_blank_pairs(raw.as_deref().unwrap_or("")));
    store.apply_params(&params);

    if store.snapshot().current_user.is_none() {
        if let Err(e) = store.request_current_user().await {
            if e.is_auth() {
                return Err(e.into());
            }
        }
    }

    if let Err(e) = store.request_users(store.api_params()).await {
        if e.is_auth() {
            return Err(e.into());
        }
    }

    let snapshot = store.snapshot();
    let template = render_listing(&snapshot);
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn toggle_row(State(state): State<SharedState>, Path(id): Path<i64>) -> Redirect {
    state.store.toggle_row_expansion(id);
    Redirect::to(&dashboard_href(&state.store.api_params().to_query()))
}

fn render_listing(snapshot: &UsersState) -> UsersTemplate {
    let params = snapshot.api_params();
    let current_id = snapshot.current_user.as_ref().map(|u| u.id);

    let forest = snapshot.page_forest();
    let mut rows = Vec::with_capacity(forest.len());
    for root in forest.roots() {
        let user = root.user();
        let expanded = snapshot.is_expanded(user.id);
        let mut row = user_row(user, false, root.child_count(), expanded, current_id);
        if !row.is_current {
            row.created_by = snapshot.creator_of(user).map(|c| c.display_name());
        }
        rows.push(row);
        if expanded {
            for child in root.children() {
                rows.push(user_row(child.user(), true, 0, false, current_id));
            }
        }
    }

    let pagination = snapshot.pagination;
    let page_href = |page: usize| {
        let request = PageRequest {
            page,
            limit: pagination.limit,
        };
        dashboard_href(&query::encode(request, params.sorting.as_ref(), &params.filters))
    };

    let pager = Pager {
        page: pagination.page,
        total_pages: pagination.total_pages,
        total_items: pagination.total_items,
        prev_href: pagination.has_previous().then(|| page_href(pagination.page - 1)),
        next_href: pagination.has_next().then(|| page_href(pagination.page + 1)),
    };

    UsersTemplate {
        user_name: snapshot
            .current_user
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_default(),
        rows,
        error: snapshot.error().map(|e| e.to_string()),
        retry_href: dashboard_href(&params.to_query()),
        search: params.filters.search.clone().unwrap_or_default(),
        user_type: params.filters.user_type.clone().unwrap_or_default(),
        user_types: USER_TYPES.to_vec(),
        is_active: params
            .filters
            .is_active
            .map(|a| a.to_string())
            .unwrap_or_default(),
        columns: sort_links(&params),
        pager,
    }
}

fn user_row(
    user: &UserRecord,
    nested: bool,
    child_count: usize,
    expanded: bool,
    current_id: Option<i64>,
) -> UserRow {
    UserRow {
        id: user.id,
        nested,
        name: user.display_name(),
        email: user.email.clone(),
        initials: user.initials(),
        avatar_url: user.avatar_url.clone().unwrap_or_default(),
        created_by: None,
        user_type: user.user_type.clone(),
        is_active: user.is_active,
        created_at: user.created_at.chars().take(10).collect(),
        child_count,
        expanded,
        is_current: current_id == Some(user.id),
    }
}

fn sort_links(params: &ListParams) -> Vec<SortLink> {
    let columns = [
        ("User", SortField::User),
        ("Type", SortField::UserType),
        ("Status", SortField::IsActive),
        ("Created", SortField::CreatedAt),
    ];

    columns
        .into_iter()
        .map(|(label, field)| {
            let active = params.sorting.as_ref().filter(|s| s.field == field);
            let direction = active
                .map(|s| s.direction.flipped())
                .unwrap_or(SortDirection::Asc);
            let indicator = match active.map(|s| s.direction) {
                Some(SortDirection::Asc) => "▲",
                Some(SortDirection::Desc) => "▼",
                None => "",
            };
            let sorting = UserSorting::new(field, direction);
            let href = dashboard_href(&query::encode(
                params.pagination,
                Some(&sorting),
                &params.filters,
            ));
            SortLink {
                label,
                href,
                indicator,
            }
        })
        .collect()
}

/// Drop `key=` pairs left by empty form fields so they read as unset.
fn without_blank_pairs(raw: &str) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        if !value.is_empty() {
            out.append_pair(&key, &value);
        }
    }
    out.finish()
}
