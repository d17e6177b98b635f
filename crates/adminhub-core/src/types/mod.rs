//! Shared value types used across the session core and the REST client.

pub mod destination;
pub mod identifier;
pub mod role;
pub mod user;

pub use destination::Destination;
pub use role::RoleId;
pub use user::UserProfile;
