//! Backend REST API configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Connection settings for the dashboard's backend REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Path of the token refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Path prefix of the user-record endpoint (`{users_path}/{id}`).
    #[serde(default = "default_users_path")]
    pub users_path: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl ApiConfig {
    /// Rejects an empty base URL or a zero timeout.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::configuration("api.base_url must not be empty"));
        }
        if self.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "api.timeout_seconds must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_users_path() -> String {
    "/users".to_string()
}

fn default_timeout() -> u64 {
    15
}
