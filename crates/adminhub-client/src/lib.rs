//! # adminhub-client
//!
//! HTTP implementation of the backend collaborators the session core
//! depends on: the token refresh endpoint and the user-record lookup.

pub mod http;

pub use http::HttpSessionApi;
