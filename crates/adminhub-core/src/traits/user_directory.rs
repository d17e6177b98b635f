//! User record lookup.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::UserProfile;

/// Fetches user records from the backend.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Looks up a user by the token's subject identifier.
    async fn get_user_by_id(&self, subject_id: &str) -> AppResult<UserProfile>;
}
