//! Per-login orchestration of the session components.

pub mod manager;

pub use manager::SessionManager;
