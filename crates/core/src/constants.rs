//! Constants used throughout the core crate.
//!
//! Path names and field limits live here so the form, the validator and the store agree.

use std::time::Duration;

/// Default directory for client data storage when no explicit directory is configured.
pub const DEFAULT_CLIENT_DATA_DIR: &str = "client_data";

/// Directory name for client records storage.
pub const CLIENTS_DIR_NAME: &str = "clients";

/// Filename for a single client record.
pub const CLIENT_FILENAME: &str = "client.yaml";

/// File under the clients directory holding the next id to assign. Ids of deleted clients are
/// never handed out again, even after a restart.
pub const NEXT_ID_FILENAME: &str = "next_id";

/// Minimum trimmed length of a client's full name.
pub const MIN_FULL_NAME_CHARS: usize = 2;

/// Maximum trimmed length of a client's full name.
pub const MAX_FULL_NAME_CHARS: usize = 200;

pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 120;

/// Maximum length of the free-text custom gender label.
pub const MAX_CUSTOM_GENDER_CHARS: usize = 100;

/// Maximum length of the background notes.
pub const MAX_BACKGROUND_CHARS: usize = 2400;

/// How long the "saved" indicator stays visible after a successful submit.
pub const SUCCESS_INDICATOR_TTL: Duration = Duration::from_secs(5);

/// Banner shown when submission is blocked by field errors.
pub const INCOMPLETE_FORM_MESSAGE: &str = "Please complete all required fields";

/// Banner shown when the directory fails without a usable message.
pub const SAVE_FAILED_FALLBACK_MESSAGE: &str = "Failed to save client profile. Please try again.";
