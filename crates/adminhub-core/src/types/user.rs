//! User record as returned by the backend.

use serde::{Deserialize, Serialize};

use super::role::RoleId;

/// Display profile of the signed-in user.
///
/// Owned by the UI layer; the session core only reads `role_id` when the
/// token carries no role claim of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend identifier, matches the token's subject claim.
    #[serde(deserialize_with = "super::identifier::string_or_number")]
    pub id: String,
    /// Given name.
    pub name: String,
    /// Family names.
    #[serde(default)]
    pub surnames: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Assigned role.
    #[serde(default)]
    pub role_id: Option<RoleId>,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserProfile {
    /// Full display name (`name surnames`).
    pub fn display_name(&self) -> String {
        if self.surnames.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.surnames)
        }
    }
}
