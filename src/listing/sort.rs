use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::UserRecord;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortField {
    /// Display name, `"first last"`.
    User,
    UserType,
    IsActive,
    CreatedAt,
    /// Any column name this build does not know how to order by.
    Other(String),
}

impl SortField {
    pub fn parse(name: &str) -> Self {
        match name {
            "user" => SortField::User,
            "userType" | "role" => SortField::UserType,
            "isActive" => SortField::IsActive,
            "createdAt" => SortField::CreatedAt,
            other => SortField::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SortField::User => "user",
            SortField::UserType => "userType",
            SortField::IsActive => "isActive",
            SortField::CreatedAt => "createdAt",
            SortField::Other(name) => name,
        }
    }

    fn compare(&self, a: &UserRecord, b: &UserRecord) -> Ordering {
        match self {
            SortField::User => a.display_name().cmp(&b.display_name()),
            SortField::UserType => a.user_type.cmp(&b.user_type),
            SortField::IsActive => a.is_active.cmp(&b.is_active),
            SortField::CreatedAt => parse_instant(&a.created_at).cmp(&parse_instant(&b.created_at)),
            SortField::Other(_) => Ordering::Equal,
        }
    }
}

impl From<String> for SortField {
    fn from(name: String) -> Self {
        SortField::parse(&name)
    }
}

impl From<SortField> for String {
    fn from(field: SortField) -> Self {
        field.as_str().to_string()
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` selects descending order, anything else ascending.
    pub fn parse(value: &str) -> Self {
        if value == "desc" {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSorting {
    pub field: SortField,
    pub direction: SortDirection,
}

impl UserSorting {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn compare(&self, a: &UserRecord, b: &UserRecord) -> Ordering {
        let ord = self.field.compare(a, b);
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

// Unparseable timestamps become `None` and order before every real instant.
fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// Order records by `sorting`. Equal keys keep their input order.
pub fn sort(records: &[UserRecord], sorting: Option<&UserSorting>) -> Vec<UserRecord> {
    let mut sorted = records.to_vec();
    if let Some(sorting) = sorting {
        // `sort_by` is a stable merge sort.
        sorted.sort_by(|a, b| sorting.compare(a, b));
    }
    sorted
}
