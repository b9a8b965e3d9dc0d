use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;

use crate::models::{CreateUserRequest, UserRecord};

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub record: UserRecord,
    pub password_hash: Option<String>,
}

/// In-memory user accounts behind the mock users API.
pub struct Directory {
    users: DashMap<i64, StoredUser>,
    next_id: AtomicI64,
}

impl Directory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// A directory holding the admin account plus a handful of sample users.
    pub fn seeded(admin_email: &str, admin_password_hash: String) -> Self {
        let dir = Self::new();

        let mut admin = sample(1, "admin", "Jane", "Cooper", admin_email, true, None, "2024-01-15T10:30:00Z");
        admin.avatar_url = Some("https://i.pravatar.cc/100?img=1".to_string());
        dir.insert(admin, Some(admin_password_hash));

        let samples = [
            sample(2, "manager", "Cody", "Fisher", "cody.fisher@example.com", true, Some(1), "2024-01-16T14:20:00Z"),
            sample(3, "staff", "Esther", "Howard", "esther.howard@example.com", true, Some(1), "2024-01-17T09:15:00Z"),
            sample(4, "viewer", "Jenny", "Wilson", "jenny.wilson@example.com", false, None, "2024-01-18T16:45:00Z"),
            sample(11, "manager", "Robert", "Fox", "robert.fox@example.com", true, Some(2), "2024-01-19T11:30:00Z"),
            sample(21, "staff", "Albert", "Flores", "albert.flores@example.com", true, Some(99), "2024-01-21T08:10:00Z"),
            sample(22, "viewer", "Ralph", "Edwards", "ralph.edwards@example.com", true, Some(4), "2024-01-22T15:35:00Z"),
        ];
        for user in samples {
            dir.insert(user, None);
        }

        // Older backends sent the creator as `parentId`.
        let mut legacy = sample(12, "staff", "Jacob", "Jones", "jacob.jones@example.com", false, None, "2024-01-20T13:20:00Z");
        legacy.parent_id = Some(1);
        dir.insert(legacy, None);

        dir
    }

    fn insert(&self, record: UserRecord, password_hash: Option<String>) {
        self.next_id.fetch_max(record.id + 1, Ordering::SeqCst);
        self.users.insert(
            record.id,
            StoredUser {
                record,
                password_hash,
            },
        );
    }

    pub fn get(&self, id: i64) -> Option<UserRecord> {
        self.users.get(&id).map(|u| u.record.clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<StoredUser> {
        self.users
            .iter()
            .find(|u| u.record.email.eq_ignore_ascii_case(email.trim()))
            .map(|u| u.value().clone())
    }

    /// All users ordered by id.
    pub fn list(&self) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self.users.iter().map(|u| u.record.clone()).collect();
        users.sort_by_key(|u| u.id);
        users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn create(
        &self,
        req: &CreateUserRequest,
        password_hash: String,
        created_by: i64,
    ) -> UserRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let avatar_url = Some(req.avatar_url.trim().to_string()).filter(|u| !u.is_empty());

        let record = UserRecord {
            id,
            user_type: req.user_type.trim().to_string(),
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            email: req.email.trim().to_string(),
            avatar_url,
            is_active: req.is_active,
            created_by: Some(created_by),
            created_at: now.clone(),
            updated_at: now,
            creator: None,
            parent_id: None,
        };
        self.insert(record.clone(), Some(password_hash));
        record
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: i64,
    user_type: &str,
    first_name: &str,
    last_name: &str,
    email: &str,
    is_active: bool,
    created_by: Option<i64>,
    created_at: &str,
) -> UserRecord {
    UserRecord {
        id,
        user_type: user_type.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        avatar_url: None,
        is_active,
        created_by,
        created_at: created_at.to_string(),
        updated_at: created_at.to_string(),
        creator: None,
        parent_id: None,
    }
}
