//! Claims carried in the bearer token payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use adminhub_core::types::RoleId;
use adminhub_core::types::identifier::string_or_number;

/// Read-only projection of the token payload.
///
/// Derived on every decode and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawClaims")]
pub struct Claims {
    /// Subject: the backend user identifier.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Role identifier, absent when the backend did not embed one.
    #[serde(rename = "roleId")]
    pub role_id: Option<RoleId>,
}

/// Payload as issued. Each role spelling is its own field so a token that
/// carries more than one of them still decodes.
#[derive(Deserialize)]
struct RawClaims {
    #[serde(deserialize_with = "string_or_number")]
    sub: String,
    #[serde(deserialize_with = "numeric_date")]
    exp: i64,
    #[serde(default, rename = "roleId")]
    role_id_camel: Option<serde_json::Value>,
    #[serde(default)]
    role_id: Option<serde_json::Value>,
    #[serde(default)]
    role: Option<serde_json::Value>,
}

impl From<RawClaims> for Claims {
    fn from(raw: RawClaims) -> Self {
        let role_id = [raw.role_id_camel, raw.role_id, raw.role]
            .into_iter()
            .flatten()
            .find_map(lenient_role);
        Self {
            sub: raw.sub,
            exp: raw.exp,
            role_id,
        }
    }
}

impl Claims {
    /// Returns the subject identifier.
    pub fn subject_id(&self) -> &str {
        &self.sub
    }

    /// Expiration in epoch milliseconds.
    pub fn expires_at_ms(&self) -> i64 {
        self.exp.saturating_mul(1000)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Milliseconds until expiry relative to `now_ms`; negative once expired.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.expires_at_ms().saturating_sub(now_ms)
    }

    /// Checks whether the token has expired at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.remaining_ms(now_ms) <= 0
    }
}

/// Accepts an integer role or an integer in a string. Anything else is
/// treated as "no role" rather than failing the whole decode.
fn lenient_role(value: serde_json::Value) -> Option<RoleId> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().map(RoleId),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok().map(RoleId),
        _ => None,
    }
}

/// NumericDate: integer or fractional seconds, truncated to whole seconds.
fn numeric_date<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Number::deserialize(deserializer)?;
    match (value.as_i64(), value.as_f64()) {
        (Some(secs), _) => Ok(secs),
        (None, Some(secs)) if secs.is_finite() => Ok(secs.trunc() as i64),
        _ => Err(serde::de::Error::custom(format!(
            "exp is not a usable timestamp: {value}"
        ))),
    }
}
