use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::http::DEFAULT_API_URL;
use crate::client::Session;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub api_url: String,
    pub session_file: Option<PathBuf>,
    pub request_timeout: Duration,
    pub log_level: String,
    pub mock_api: Option<MockApiConfig>,
}

/// Settings for the built-in development users API.
#[derive(Debug, Clone)]
pub struct MockApiConfig {
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("USERDASH_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid USERDASH_HOST: {e}"))?;

        let port: u16 = env_or("USERDASH_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid USERDASH_PORT: {e}"))?;

        let api_url = env_or("USERDASH_API_URL", DEFAULT_API_URL);

        let session_file = std::env::var("USERDASH_SESSION_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .or_else(Session::default_path);

        let timeout_secs: u64 = env_or("USERDASH_REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid USERDASH_REQUEST_TIMEOUT_SECS: {e}"))?;

        let log_level = env_or("USERDASH_LOG_LEVEL", "info");

        let mock_api = match env_or("USERDASH_MOCK_API", "false").as_str() {
            "true" | "1" => Some(MockApiConfig {
                jwt_secret: env_required("USERDASH_JWT_SECRET")?,
                admin_email: env_or("USERDASH_ADMIN_EMAIL", "admin@example.com"),
                admin_password: env_required("USERDASH_ADMIN_PASSWORD")?,
            }),
            _ => None,
        };

        Ok(Config {
            host,
            port,
            api_url,
            session_file,
            request_timeout: Duration::from_secs(timeout_secs),
            log_level,
            mock_api,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
