use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

use crate::client::UsersApi;
use crate::error::ClientError;
use crate::listing::{
    self, Forest, ListParams, PageRequest, PaginationState, UserFilters, UserSorting, paginate,
};
use crate::models::{CreateUserRequest, LoginRequest, LoginResponse, UserRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// One consistent view of the users listing.
#[derive(Debug, Clone, Default)]
pub struct UsersState {
    /// Hierarchy over `records`.
    pub forest: Forest,
    /// Filtered and sorted records of the last committed fetch.
    pub records: Vec<UserRecord>,
    /// Raw records as the users API returned them.
    pub all_users: Vec<UserRecord>,
    pub current_user: Option<UserRecord>,
    pub pagination: PaginationState,
    pub filters: UserFilters,
    pub sorting: Option<UserSorting>,
    pub status: FetchStatus,
    pub expanded_rows: Vec<i64>,
    pub last_fetch_params: Option<ListParams>,
    /// Newest users request that committed, or failed while still the latest.
    settled_seq: u64,
}

impl UsersState {
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn api_params(&self) -> ListParams {
        ListParams {
            pagination: self.pagination.request(),
            sorting: self.sorting.clone(),
            filters: self.filters.clone(),
        }
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded_rows.contains(&id)
    }

    /// Records on the current page, in listing order.
    pub fn page_records(&self) -> &[UserRecord] {
        paginate(&self.records, self.pagination.page, self.pagination.limit)
    }

    /// Hierarchy over the current page only.
    pub fn page_forest(&self) -> Forest {
        listing::build(self.page_records(), self.current_user.as_ref())
    }

    /// Creator of `user` when it is among the listed users or is the current user.
    pub fn creator_of(&self, user: &UserRecord) -> Option<&UserRecord> {
        let creator = user.creator_id().filter(|id| *id != user.id)?;
        self.forest.find(creator).map(|node| node.user())
    }

    fn record_error(&mut self, err: &ClientError) {
        self.status = FetchStatus::Error(err.to_string());
        if err.is_auth() {
            self.current_user = None;
            self.rebuild_forest();
        }
    }

    fn rebuild_forest(&mut self) {
        self.forest = listing::build(&self.records, self.current_user.as_ref());
    }
}

/// Owns the listing state and runs fetches against a [`UsersApi`].
///
/// Every change swaps in a whole new [`UsersState`], so a snapshot taken with
/// [`UserStore::snapshot`] never shows a half-applied update. Fetches are
/// tagged with a sequence number. A response older than the last settled
/// request is dropped, and an error only counts while its request is the
/// latest one issued.
pub struct UserStore {
    api: Arc<dyn UsersApi>,
    state: ArcSwap<UsersState>,
    issued_seq: AtomicU64,
}

impl UserStore {
    pub fn new(api: Arc<dyn UsersApi>) -> Self {
        Self {
            api,
            state: ArcSwap::from_pointee(UsersState::default()),
            issued_seq: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &Arc<dyn UsersApi> {
        &self.api
    }

    pub fn snapshot(&self) -> Arc<UsersState> {
        self.state.load_full()
    }

    pub fn api_params(&self) -> ListParams {
        self.state.load().api_params()
    }

    fn update(&self, mut f: impl FnMut(&mut UsersState)) {
        self.state.rcu(|cur| {
            let mut next = UsersState::clone(cur);
            f(&mut next);
            next
        });
    }

    pub fn set_filters(&self, filters: UserFilters) {
        self.update(|s| {
            s.filters = filters.clone();
            s.pagination.page = 1;
        });
    }

    pub fn set_sorting(&self, sorting: Option<UserSorting>) {
        self.update(|s| s.sorting = sorting.clone());
    }

    pub fn set_pagination(&self, page: usize, limit: Option<usize>) {
        self.update(|s| {
            s.pagination.page = page.max(1);
            if let Some(limit) = limit.filter(|l| *l > 0) {
                s.pagination.limit = limit;
                let total = s.pagination.total_items;
                s.pagination.recompute(total);
            }
        });
    }

    /// Apply a whole decoded URL state at once.
    pub fn apply_params(&self, params: &ListParams) {
        let PageRequest { page, limit } = params.pagination;
        self.update(|s| {
            s.filters = params.filters.clone();
            s.sorting = params.sorting.clone();
            s.pagination.page = page.max(1);
            if limit > 0 {
                s.pagination.limit = limit;
            }
            let total = s.pagination.total_items;
            s.pagination.recompute(total);
        });
    }

    pub fn toggle_row_expansion(&self, id: i64) {
        self.update(|s| {
            if let Some(pos) = s.expanded_rows.iter().position(|r| *r == id) {
                s.expanded_rows.remove(pos);
            } else {
                s.expanded_rows.push(id);
            }
        });
    }

    pub fn clear_error(&self) {
        self.update(|s| {
            if matches!(s.status, FetchStatus::Error(_)) {
                s.status = FetchStatus::Idle;
            }
        });
    }

    /// Drop listing data and descriptors. The signed-in user is kept.
    pub fn reset(&self) {
        self.update(|s| {
            *s = UsersState {
                current_user: s.current_user.clone(),
                settled_seq: s.settled_seq,
                status: if s.is_loading() {
                    FetchStatus::Loading
                } else {
                    FetchStatus::Idle
                },
                ..UsersState::default()
            };
        });
    }

    fn fail(&self, err: &ClientError) {
        self.update(|s| s.record_error(err));
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.update(|s| s.status = FetchStatus::Loading);
        match self.api.login(credentials).await {
            Ok(resp) if resp.status == "success" && !resp.token.is_empty() => {
                self.update(|s| s.status = FetchStatus::Idle);
                Ok(resp)
            }
            Ok(resp) => {
                let message = if resp.message.is_empty() {
                    "Login failed".to_string()
                } else {
                    resp.message.clone()
                };
                let err = ClientError::Auth(message);
                self.fail(&err);
                Err(err)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.api.logout();
        self.update(|s| {
            *s = UsersState {
                settled_seq: s.settled_seq,
                ..UsersState::default()
            };
        });
        tracing::info!("Signed out");
    }

    pub async fn request_current_user(&self) -> Result<UserRecord, ClientError> {
        self.update(|s| s.status = FetchStatus::Loading);
        match self.api.fetch_current_user().await {
            Ok(user) => {
                self.update(|s| {
                    s.current_user = Some(user.clone());
                    s.rebuild_forest();
                    s.status = FetchStatus::Success;
                });
                Ok(user)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch current user: {e}");
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Fetch, filter, sort and arrange the users for `params`.
    ///
    /// Returns the snapshot after the response was applied, or the current
    /// one when the response was superseded.
    pub async fn request_users(&self, params: ListParams) -> Result<Arc<UsersState>, ClientError> {
        let seq = self.issued_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.update(|s| s.status = FetchStatus::Loading);

        let result = self.api.fetch_users(&params).await;

        match result {
            Ok(page) => {
                let records = listing::shape(&page.users, &params);
                let mut committed = false;
                self.update(|s| {
                    committed = seq > s.settled_seq;
                    if !committed {
                        return;
                    }
                    s.records = records.clone();
                    s.all_users = page.users.clone();
                    s.rebuild_forest();
                    s.pagination = PaginationState {
                        page: params.pagination.page.max(1),
                        limit: params.pagination.limit.max(1),
                        ..PaginationState::default()
                    };
                    s.pagination.recompute(records.len());
                    s.last_fetch_params = Some(params.clone());
                    s.settled_seq = seq;
                    // Anything issued after this one has not settled yet.
                    s.status = if seq == self.issued_seq.load(Ordering::SeqCst) {
                        FetchStatus::Success
                    } else {
                        FetchStatus::Loading
                    };
                });
                if committed {
                    tracing::debug!(
                        "Users request #{seq} committed: {} of {} records",
                        records.len(),
                        page.users.len()
                    );
                } else {
                    tracing::debug!("Users request #{seq} superseded; response dropped");
                }
                Ok(self.snapshot())
            }
            Err(e) => {
                let mut recorded = false;
                self.update(|s| {
                    let latest = self.issued_seq.load(Ordering::SeqCst);
                    recorded = seq == latest && seq > s.settled_seq;
                    if recorded {
                        s.settled_seq = seq;
                        s.record_error(&e);
                    }
                });
                if recorded {
                    tracing::warn!("Users request #{seq} failed: {e}");
                } else {
                    tracing::debug!("Users request #{seq} superseded; error dropped: {e}");
                }
                Err(e)
            }
        }
    }

    pub async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> Result<Option<UserRecord>, ClientError> {
        self.update(|s| s.status = FetchStatus::Loading);
        match self.api.create_user(request).await {
            Ok(created) => {
                self.update(|s| {
                    if let Some(user) = &created {
                        s.all_users.push(user.clone());
                        s.records.push(user.clone());
                        s.rebuild_forest();
                        let total = s.pagination.total_items + 1;
                        s.pagination.recompute(total);
                    }
                    s.status = FetchStatus::Success;
                });
                if let Some(user) = &created {
                    tracing::info!("Created user {} ({})", user.id, user.email);
                }
                Ok(created)
            }
            Err(e) => {
                tracing::warn!("Failed to create user: {e}");
                self.fail(&e);
                Err(e)
            }
        }
    }
}
