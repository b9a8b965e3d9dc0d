pub mod user;

pub use user::{
    CreateUserRequest, CreateUserResponse, CurrentUserResponse, LoginRequest, LoginResponse,
    UserRecord, UsersPage, UsersResponse,
};
