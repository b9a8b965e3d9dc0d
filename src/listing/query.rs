//! Shareable URL form of the listing state.
//!
//! Keys: `page`, `limit`, `sortBy`, `sortOrder`, `search`, `userType` (legacy
//! `role`) and `isActive`. Default page and limit are left out so links stay
//! short.

use super::filter::UserFilters;
use super::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, PageRequest};
use super::sort::{SortDirection, SortField, UserSorting};

/// Searches shorter than this are treated as stray keystrokes.
pub const MIN_SEARCH_LEN: usize = 2;

pub fn encode(
    pagination: PageRequest,
    sorting: Option<&UserSorting>,
    filters: &UserFilters,
) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());

    if pagination.page != DEFAULT_PAGE {
        out.append_pair("page", &pagination.page.to_string());
    }
    if pagination.limit != DEFAULT_LIMIT {
        out.append_pair("limit", &pagination.limit.to_string());
    }

    if let Some(sorting) = sorting {
        out.append_pair("sortBy", sorting.field.as_str());
        out.append_pair("sortOrder", sorting.direction.as_str());
    }

    append_filters(&mut out, filters);
    out.finish()
}

/// Filter and sort keys only, as sent to the remote users API.
pub fn encode_remote(sorting: Option<&UserSorting>, filters: &UserFilters) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    if let Some(sorting) = sorting {
        out.append_pair("sortBy", sorting.field.as_str());
        out.append_pair("sortOrder", sorting.direction.as_str());
    }
    append_filters(&mut out, filters);
    out.finish()
}

fn append_filters(out: &mut form_urlencoded::Serializer<'_, String>, filters: &UserFilters) {
    if let Some(search) = filters.search() {
        out.append_pair("search", search);
    }
    if let Some(user_type) = filters.user_type() {
        out.append_pair("userType", user_type);
    }
    if let Some(active) = filters.is_active {
        out.append_pair("isActive", if active { "true" } else { "false" });
    }
}

pub fn decode(query: &str) -> (PageRequest, Option<UserSorting>, UserFilters) {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut page = DEFAULT_PAGE;
    let mut limit = DEFAULT_LIMIT;
    let mut sort_by = String::new();
    let mut sort_order = SortDirection::Asc;
    let mut filters = UserFilters::default();
    let mut user_type: Option<String> = None;
    let mut role: Option<String> = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "page" => page = parse_positive(&value).unwrap_or(DEFAULT_PAGE),
            "limit" => limit = parse_positive(&value).unwrap_or(DEFAULT_LIMIT),
            "sortBy" => sort_by = value.into_owned(),
            "sortOrder" => sort_order = SortDirection::parse(&value),
            "search" => {
                filters.search =
                    Some(value.into_owned()).filter(|s| s.chars().count() >= MIN_SEARCH_LEN);
            }
            "userType" => user_type = Some(value.into_owned()),
            "role" => role = Some(value.into_owned()),
            "isActive" => filters.is_active = Some(value == "true"),
            _ => {}
        }
    }

    filters.user_type = user_type
        .or(role)
        .filter(|t| !t.is_empty() && t != "all");

    let sorting = if sort_by.is_empty() {
        None
    } else {
        Some(UserSorting::new(SortField::parse(&sort_by), sort_order))
    };

    (PageRequest { page, limit }, sorting, filters)
}

fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|n| *n > 0)
}
