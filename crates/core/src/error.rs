use thiserror::Error;

/// Errors raised while parsing or converting core primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),
}

/// Result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl From<hex::FromHexError> for CoreError {
    fn from(err: hex::FromHexError) -> Self {
        CoreError::InvalidHex(err.to_string())
    }
}
