use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("invalid service data: {0}")]
    InvalidServiceData(String),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("corrupt state file: {0}")]
    CorruptState(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
