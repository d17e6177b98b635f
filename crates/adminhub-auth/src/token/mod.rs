//! Bearer token storage, decoding, and claims.

pub mod claims;
pub mod decoder;
pub mod memory;
pub mod store;

pub use claims::Claims;
pub use decoder::{TokenError, decode_claims};
pub use memory::MemoryTokenStorage;
pub use store::TokenStore;
