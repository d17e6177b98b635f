//! # adminhub-core
//!
//! Core crate for the AdminHub dashboard session layer. Contains
//! configuration schemas, the collaborator traits the session core is
//! injected with, shared types, session events, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other AdminHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
