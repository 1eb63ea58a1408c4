#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("Client not found")]
    NotFound,
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create client directory: {0}")]
    ClientDirCreation(std::io::Error),
    #[error(
        "create failed and cleanup also failed (path: {path}): create={create_error}; cleanup={cleanup_error}",
        path = path.display()
    )]
    CleanupAfterCreateFailed {
        path: std::path::PathBuf,
        #[source]
        create_error: Box<ClientError>,
        cleanup_error: std::io::Error,
    },
    #[error("failed to write client file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read client file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to remove client directory: {0}")]
    FileDelete(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("invalid client uuid: {0}")]
    Uuid(#[from] therapist_uuid::UuidError),
    #[error("client store lock poisoned")]
    LockPoisoned,
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
