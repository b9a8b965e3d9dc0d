use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, Params, Version};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::UserRecord;
use crate::state::SharedState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: i64,
}

const TOKEN_TTL_HOURS: i64 = 8;

/// Token keys and the password hasher, set up once per mock instance.
pub struct Credentials {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    hasher: Argon2<'static>,
}

impl Credentials {
    pub fn new(jwt_secret: &str) -> Result<Self, String> {
        // Accounts here are throwaway, so hashing stays cheap: 8 MiB, one pass.
        let params = Params::new(8 * 1024, 1, 1, None)
            .map_err(|e| format!("argon2 params rejected: {e}"))?;
        Ok(Self {
            encoding: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            hasher: Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn issue_token(&self, user: &UserRecord) -> Result<String, String> {
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| format!("cannot sign token for user {}: {e}", user.id))
    }

    /// Claims of a well-formed, unexpired token signed with our secret.
    pub fn read_token(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .ok()
            .map(|data| data.claims)
    }

    pub fn hash_password(&self, password: &str) -> Result<String, String> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| format!("cannot hash password: {e}"))
    }

    /// A stored hash that fails to parse never matches.
    pub fn password_matches(&self, password: &str, stored: &str) -> bool {
        PasswordHash::new(stored)
            .map(|parsed| self.hasher.verify_password(password.as_bytes(), &parsed).is_ok())
            .unwrap_or(false)
    }
}

/// The account behind a request's bearer token.
#[derive(Debug, Clone)]
pub struct ApiCaller {
    pub user_id: i64,
    pub email: String,
}

impl FromRequestParts<SharedState> for ApiCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let mock = state.mock()?;

        let auth_header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        let claims = mock
            .credentials
            .read_token(token)
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        // A token for an account that no longer exists is as good as none.
        if mock.directory.get(claims.sub).is_none() {
            return Err(AppError::Unauthorized("Unknown account".to_string()));
        }

        Ok(ApiCaller {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}
