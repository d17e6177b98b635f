//! Token refresh capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Response body of a successful refresh call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    /// The newly issued bearer token.
    pub access_token: String,
}

/// Requests a new bearer token for a subject.
///
/// Failures are reported as `Err`; callers decide whether a failure is
/// fatal to the session.
#[async_trait]
pub trait TokenRefresher: Send + Sync + 'static {
    /// Issues a refresh request on behalf of `subject`.
    async fn refresh(&self, subject: &str) -> AppResult<RefreshedToken>;
}
