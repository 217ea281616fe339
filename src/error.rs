//! Error types for Pattern Pal

use thiserror::Error;

/// Result type alias for Pattern Pal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the pure analysis stages
///
/// Scanning, normalizing, clustering, insight generation and mood synthesis
/// never fail. Only storage, configuration and orchestration surface errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
