//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables.

use crate::constants::{CLIENTS_DIR_NAME, DEFAULT_CLIENT_DATA_DIR};
use crate::{ClientError, ClientResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    client_data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` if `client_data_dir` is empty.
    pub fn new(client_data_dir: PathBuf) -> ClientResult<Self> {
        if client_data_dir.as_os_str().is_empty() {
            return Err(ClientError::InvalidInput(
                "client_data_dir cannot be empty".into(),
            ));
        }

        Ok(Self { client_data_dir })
    }

    pub fn client_data_dir(&self) -> &Path {
        &self.client_data_dir
    }

    pub fn clients_dir(&self) -> PathBuf {
        self.client_data_dir.join(CLIENTS_DIR_NAME)
    }
}

/// Resolve the client data directory from an optional configured value.
///
/// Empty or whitespace-only values fall back to [`DEFAULT_CLIENT_DATA_DIR`]. The directory is
/// created if it does not exist yet.
///
/// # Errors
///
/// Returns `ClientError::StorageDirCreation` if the directory cannot be created, or
/// `ClientError::InvalidInput` if the path exists but is not a directory.
pub fn resolve_client_data_dir(value: Option<String>) -> ClientResult<PathBuf> {
    let dir = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CLIENT_DATA_DIR));

    if dir.exists() && !dir.is_dir() {
        return Err(ClientError::InvalidInput(format!(
            "client data path is not a directory: {}",
            dir.display()
        )));
    }

    std::fs::create_dir_all(&dir).map_err(ClientError::StorageDirCreation)?;
    Ok(dir)
}
