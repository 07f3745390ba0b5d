//! Credential model and bearer extraction for inbound requests.

pub mod credential;

pub use credential::*;
