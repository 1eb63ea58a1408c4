//! # Therapist Core
//!
//! Core logic for the TherapistHelper client directory.
//!
//! This crate contains:
//! - The client profile workflow: form state, field validation and the submission coordinator
//! - The client directory contract consumed by that workflow
//! - File-backed client storage under `CLIENT_DATA_DIR`
//!
//! **No API concerns**: HTTP servers and clients belong in `api-rest` and `api-client`.

pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod form;
pub mod profile;
pub mod repositories;
pub mod submission;
pub mod validation;

pub use api_shared::{ClientPayload, ClientRecord, ClientSummary, Gender};
pub use config::CoreConfig;
pub use constants::DEFAULT_CLIENT_DATA_DIR;
pub use directory::{ClientDirectory, DirectoryError, LocalDirectory};
pub use error::{ClientError, ClientResult};
pub use form::ClientForm;
pub use profile::{ProfileTab, ProfileView};
pub use repositories::clients::ClientService;
pub use submission::{
    PendingSubmit, SubmissionCoordinator, SubmissionState, SubmitRejected, SubmitTarget,
};
pub use therapist_types::{NonEmptyText, TextError};
pub use therapist_uuid::ShardableUuid;
pub use validation::{FieldError, FieldErrors, FormField};
