//! Repository management modules.
//!
//! Services that own client data on disk.

pub mod clients;
pub(crate) mod helpers;
