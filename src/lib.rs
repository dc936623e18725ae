//! # Tienda (catalog & accounts API)
//!
//! `tienda` is a small e-commerce HTTP API backed by Postgres. It exposes
//! conventional CRUD endpoints for the catalog (categories, products,
//! reviews) and a three-step account flow:
//!
//! - **Register** creates an inactive account together with a one-time
//!   6-digit confirmation code, atomically.
//! - **Confirm** consumes the code exactly once and activates the account.
//! - **Login** verifies credentials against an active account and returns an
//!   opaque bearer token; repeated logins return the same token.
//!
//! The database is the single source of truth: every workflow is one
//! request-scoped transaction, and username uniqueness is enforced by the
//! store, not by application-level locking.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
