use serde::{Deserialize, Serialize};

use crate::models::UserRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserFilters {
    pub fn is_empty(&self) -> bool {
        self.search().is_none() && self.user_type().is_none() && self.is_active.is_none()
    }

    /// Search text, or `None` when unset or empty.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn user_type(&self) -> Option<&str> {
        self.user_type.as_deref().filter(|s| !s.is_empty())
    }

    pub fn matches(&self, user: &UserRecord) -> bool {
        if let Some(term) = self.search() {
            let term = term.to_lowercase();
            let name_hit = user.display_name().to_lowercase().contains(&term);
            if !name_hit && !user.email.to_lowercase().contains(&term) {
                return false;
            }
        }

        if let Some(user_type) = self.user_type() {
            if user.user_type != user_type {
                return false;
            }
        }

        if let Some(active) = self.is_active {
            if user.is_active != active {
                return false;
            }
        }

        true
    }
}

/// Keep the records matching every set constraint, in input order.
pub fn filter(records: &[UserRecord], filters: &UserFilters) -> Vec<UserRecord> {
    records
        .iter()
        .filter(|user| filters.matches(user))
        .cloned()
        .collect()
}
