//! Claim extraction from compact tokens.
//!
//! Only the structure is checked here. Signature verification belongs to
//! the backend that issued the token.

use jsonwebtoken::dangerous::insecure_decode;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use thiserror::Error;

use super::claims::Claims;

/// Why a token could not be decoded.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is not three non-empty dot-separated segments.
    #[error("token must have three dot-separated segments")]
    MissingSegments,
    /// A segment is not valid base64url.
    #[error("token segment is not valid base64url: {0}")]
    Encoding(String),
    /// The header or payload is not the expected JSON.
    #[error("token payload is not valid claims JSON: {0}")]
    Payload(String),
    /// Any other rejection, such as an unknown algorithm name.
    #[error("token could not be decoded: {0}")]
    Invalid(String),
}

impl From<JwtError> for TokenError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            JwtErrorKind::InvalidToken => Self::MissingSegments,
            JwtErrorKind::Base64(e) => Self::Encoding(e.to_string()),
            JwtErrorKind::Json(e) => Self::Payload(e.to_string()),
            JwtErrorKind::Utf8(e) => Self::Payload(e.to_string()),
            _ => Self::Invalid(err.to_string()),
        }
    }
}

/// Extracts the claims from a compact `header.payload.signature` token.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let token = token.trim();
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(TokenError::MissingSegments);
    }

    let data = insecure_decode::<Claims>(token)?;
    Ok(data.claims)
}
