use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::mock::MockApi;
use crate::store::UserStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub store: Arc<UserStore>,
    pub mock: Option<MockApi>,
}

impl AppState {
    pub fn mock(&self) -> Result<&MockApi, AppError> {
        self.mock
            .as_ref()
            .ok_or_else(|| AppError::NotFound("Mock users API is disabled".to_string()))
    }
}
