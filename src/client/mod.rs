pub mod http;
pub mod session;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::listing::ListParams;
use crate::models::{CreateUserRequest, LoginRequest, LoginResponse, UserRecord, UsersPage};

pub use http::HttpUsersApi;
pub use session::Session;

/// The remote users service, as seen by the store.
#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ClientError>;

    fn logout(&self);

    fn is_authenticated(&self) -> bool;

    async fn fetch_current_user(&self) -> Result<UserRecord, ClientError>;

    async fn fetch_users(&self, params: &ListParams) -> Result<UsersPage, ClientError>;

    /// Returns the created record when the service echoes it back.
    async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> Result<Option<UserRecord>, ClientError>;
}
