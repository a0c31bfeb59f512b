use ledgerkit_core::ProviderError;
use thiserror::Error;

/// Errors raised while talking to a node
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// The node answered with an error object.
    #[error("RPC error {code}: {message}")]
    Response { code: i64, message: String },

    #[error("Invalid response to {method}: {message}")]
    InvalidResult { method: String, message: String },

    #[error("Invalid endpoint: {0}")]
    InvalidUrl(String),
}

impl From<RpcError> for ProviderError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Response { code, message } => ProviderError::Rpc { code, message },
            RpcError::InvalidResult { method, message } => {
                ProviderError::InvalidResponse { method, message }
            }
            RpcError::Http(message) | RpcError::InvalidUrl(message) => {
                ProviderError::Transport(message)
            }
            RpcError::Parse(message) => ProviderError::Transport(format!("Parse error: {message}")),
        }
    }
}
