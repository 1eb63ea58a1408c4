//! The client directory contract.
//!
//! The profile workflow talks to the system of record through [`ClientDirectory`]. The REST
//! client in `api-client` implements it over HTTP; [`LocalDirectory`] implements it directly on
//! top of [`ClientService`] for in-process use.

use crate::{ClientError, ClientPayload, ClientRecord, ClientService};
use async_trait::async_trait;

/// Failure of a directory operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("Client not found")]
    NotFound,
    /// The service refused the request, usually because the payload failed its validation.
    #[error("{0}")]
    Rejected(String),
    /// The service failed while handling the request.
    #[error("{0}")]
    Service(String),
    #[error("network error: {0}")]
    Network(String),
}

impl DirectoryError {
    /// Message suitable for the form's general error banner, or `None` if there is nothing
    /// better to say than the generic fallback.
    pub fn banner_message(&self) -> Option<String> {
        let message = self.to_string();
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

impl From<ClientError> for DirectoryError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound => DirectoryError::NotFound,
            ClientError::InvalidInput(msg) => DirectoryError::Rejected(msg),
            other => DirectoryError::Service(other.to_string()),
        }
    }
}

/// The consumed client directory service.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn create_client(&self, payload: &ClientPayload) -> Result<ClientRecord, DirectoryError>;

    async fn update_client(
        &self,
        id: u64,
        payload: &ClientPayload,
    ) -> Result<ClientRecord, DirectoryError>;

    async fn get_client(&self, id: u64) -> Result<ClientRecord, DirectoryError>;

    async fn list_clients(&self) -> Result<Vec<ClientRecord>, DirectoryError>;
}

/// In-process directory backed by the file store.
#[derive(Clone, Debug)]
pub struct LocalDirectory {
    service: ClientService,
}

impl LocalDirectory {
    pub fn new(service: ClientService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ClientService {
        &self.service
    }
}

#[async_trait]
impl ClientDirectory for LocalDirectory {
    async fn create_client(&self, payload: &ClientPayload) -> Result<ClientRecord, DirectoryError> {
        Ok(self.service.create(payload)?)
    }

    async fn update_client(
        &self,
        id: u64,
        payload: &ClientPayload,
    ) -> Result<ClientRecord, DirectoryError> {
        Ok(self.service.update(id, payload)?)
    }

    async fn get_client(&self, id: u64) -> Result<ClientRecord, DirectoryError> {
        Ok(self.service.get(id)?)
    }

    async fn list_clients(&self) -> Result<Vec<ClientRecord>, DirectoryError> {
        Ok(self.service.list(0, usize::MAX)?)
    }
}
