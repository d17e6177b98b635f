//! Numeric role identifier as issued by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role identifier carried in the token's role claim and in user records.
///
/// Roles are opaque numbers at this layer; which role may enter which
/// destination is decided by the gate's route policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub i64);

impl RoleId {
    /// Returns the raw numeric identifier.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for RoleId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
