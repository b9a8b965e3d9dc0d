use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde_json::{Map, Value};

/// Key the token is stored under in the session file.
pub const TOKEN_KEY: &str = "auth_token";

/// The signed-in session: one bearer token, optionally mirrored to disk.
#[derive(Debug, Default)]
pub struct Session {
    token: ArcSwapOption<String>,
    path: Option<PathBuf>,
}

impl Session {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A session backed by `path`. A token already stored there is picked up.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = read_token(&path);
        if token.is_some() {
            tracing::debug!("Restored session token from {}", path.display());
        }
        Self {
            token: ArcSwapOption::from(token.map(Arc::new)),
            path: Some(path),
        }
    }

    /// `<data dir>/userdash/session.json` for the current platform.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "userdash")
            .map(|dirs| dirs.data_dir().join("session.json"))
    }

    pub fn token(&self) -> Option<String> {
        self.token.load_full().map(|t| t.as_ref().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.load().is_some()
    }

    pub fn set_token(&self, token: &str) {
        self.token.store(Some(Arc::new(token.to_string())));
        if let Some(path) = &self.path {
            if let Err(e) = write_token(path, token) {
                tracing::warn!("Failed to persist session token to {}: {e}", path.display());
            }
        }
    }

    pub fn clear(&self) {
        self.token.store(None);
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Failed to remove session file {}: {e}", path.display());
                }
            }
        }
    }
}

fn read_token(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let stored: Map<String, Value> = match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!("Ignoring unreadable session file {}: {e}", path.display());
            return None;
        }
    };
    stored
        .get(TOKEN_KEY)
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

fn write_token(path: &Path, token: &str) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| format!("create {}: {e}", dir.display()))?;
    }
    let mut stored = Map::new();
    stored.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
    let body = serde_json::to_string_pretty(&stored).map_err(|e| e.to_string())?;
    std::fs::write(path, body).map_err(|e| e.to_string())
}
