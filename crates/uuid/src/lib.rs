//! UUID and sharded-path utilities.
//!
//! Every client record carries a UUID in addition to its numeric id. The UUID is the stable
//! storage key: client files live under a sharded directory derived from it.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the value produced by `Uuid::new_v4().simple().to_string()`. Externally supplied
//! identifiers must already be canonical; use [`ShardableUuid::parse`] to validate them.
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, data lives under `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`, e.g.
//! `client_data/clients/55/0e/550e8400e29b41d4a716446655440000/`.

mod service;

pub use service::ShardableUuid;

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
