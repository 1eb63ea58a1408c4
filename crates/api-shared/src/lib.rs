//! # API Shared
//!
//! Wire types shared by the REST server, the HTTP directory client and the core workflow.
//!
//! Contains:
//! - Client record, payload and list types (`clients` module)
//! - Service banner, health and error bodies
//! - Shared services like `HealthService`
//!
//! Every type derives `serde` and `utoipa::ToSchema` so the same definitions drive JSON encoding
//! and the OpenAPI document.

pub mod clients;
pub mod health;

pub use clients::{
    ClientCountRes, ClientPayload, ClientRecord, ClientSummary, ErrorRes, Gender,
    GenderParseError, ServiceInfoRes,
};
pub use health::{HealthRes, HealthService};

/// Path prefix for the versioned REST API.
pub const API_V1_PREFIX: &str = "/api/v1";
