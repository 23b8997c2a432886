//! Request and response types for the Storage Crab API.
//!
//! The API speaks snake_case JSON; field names here map one-to-one.

use serde::{Deserialize, Serialize};

/// Login request body sent to POST token/get/.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Refresh request body sent to POST token/refresh/.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Token pair returned by both token/get/ and token/refresh/.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// One entry of GET files/.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    /// Size in bytes.
    pub size: u64,
}

impl FileEntry {
    /// Size rendered for display, e.g. `1.5 MB`.
    pub fn human_size(&self) -> String {
        const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

        if self.size < 1024 {
            return format!("{} B", self.size);
        }

        let mut value = self.size as f64 / 1024.0;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        format!("{:.1} {}", value, UNITS[unit])
    }
}
