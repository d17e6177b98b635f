//! Navigation destinations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A navigation target inside the dashboard, e.g. `/licenses/42`.
///
/// Paths are normalized on construction: query strings and fragments are
/// dropped, a leading `/` is enforced, and trailing slashes are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destination(String);

impl Destination {
    /// Creates a normalized destination from a raw path.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref();
        let path = raw
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let trimmed = path.trim_matches('/');
        Self(format!("/{trimmed}"))
    }

    /// Returns the normalized path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the non-empty path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Returns `true` if `self` equals `prefix` or lies underneath it on a
    /// segment boundary (`/licenses/42` is under `/licenses`, `/licensees`
    /// is not).
    pub fn is_under(&self, prefix: &Destination) -> bool {
        if prefix.0 == "/" {
            return true;
        }
        match self.0.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Destination {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
