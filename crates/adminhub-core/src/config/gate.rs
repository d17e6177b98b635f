//! Role gate routing configuration.

use serde::{Deserialize, Serialize};

/// Navigation gating configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Public entry point unauthenticated navigation is redirected to.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Destination for authenticated users lacking the required role.
    #[serde(default = "default_not_authorized_path")]
    pub not_authorized_path: String,
    /// Role-restricted routes. Routes not listed here are open to any
    /// authenticated role.
    #[serde(default)]
    pub routes: Vec<RouteRule>,
}

/// A single role-restricted route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteRule {
    /// Route path, e.g. `/licenses`. Also covers nested paths.
    pub path: String,
    /// Role identifiers allowed to enter the route.
    pub roles: Vec<i64>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            not_authorized_path: default_not_authorized_path(),
            routes: Vec::new(),
        }
    }
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_not_authorized_path() -> String {
    "/not-authorized".to_string()
}
