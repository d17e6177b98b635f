//! Collaborator traits the session core is injected with.

pub mod clock;
pub mod refresher;
pub mod token_storage;
pub mod user_directory;

pub use clock::{Clock, ManualClock, SystemClock};
pub use refresher::{RefreshedToken, TokenRefresher};
pub use token_storage::TokenStorage;
pub use user_directory::UserDirectory;
