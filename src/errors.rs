use thiserror::Error;

/// Error type that captures common account and persistence failures.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
}
