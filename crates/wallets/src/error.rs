use ledgerkit_core::{CoreError, ProviderError, SignerError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type WalletResult<T> = std::result::Result<T, WalletError>;

impl From<secp256k1::Error> for WalletError {
    fn from(err: secp256k1::Error) -> Self {
        WalletError::Crypto(err.to_string())
    }
}

impl From<WalletError> for SignerError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Provider(inner) => SignerError::Provider(inner),
            other => SignerError::Signing(other.to_string()),
        }
    }
}
