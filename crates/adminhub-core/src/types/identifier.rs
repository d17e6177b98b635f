//! Lenient identifier deserialization.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentifier {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

/// Deserializes an identifier the backend may send as a JSON string or
/// number into its string form.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawIdentifier::deserialize(deserializer)? {
        RawIdentifier::Text(s) => s,
        RawIdentifier::Signed(n) => n.to_string(),
        RawIdentifier::Unsigned(n) => n.to_string(),
    })
}
