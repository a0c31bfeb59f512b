//! The signing identity collaborator.

use crate::primitives::{Address, TxHash};
use crate::provider::{Provider, ProviderError};
use crate::transaction::TransactionRequest;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Transaction sender {requested} does not match signer {signer}")]
    SenderMismatch { requested: Address, signer: Address },
}

/// An identity able to authorize transactions for one address.
#[async_trait]
pub trait Signer: Send + Sync + fmt::Debug {
    fn address(&self) -> Address;

    /// Signs `tx` as this identity and submits it through `provider`.
    async fn sign_and_submit(
        &self,
        tx: TransactionRequest,
        provider: &dyn Provider,
    ) -> Result<TxHash, SignerError>;
}
