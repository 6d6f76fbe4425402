//! # tickdesk Shared Library
//!
//! This crate contains shared types, utilities, and business logic used
//! across the tickdesk API server and expiry worker.
//!
//! ## Module Organization
//!
//! - `models`: database models (users, tickets)
//! - `auth`: authentication and authorization primitives
//! - `notify`: out-of-band notification dispatch
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod notify;

/// Current version of the tickdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
