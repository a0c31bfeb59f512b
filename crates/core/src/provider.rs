//! The network connection collaborator.

use crate::primitives::{Address, Bytes, TxHash};
use crate::transaction::{TransactionInfo, TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use num_bigint::BigUint;
use std::fmt;
use thiserror::Error;

/// Errors reported by a network connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response to {method}: {message}")]
    InvalidResponse { method: String, message: String },
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    pub fn invalid_response(method: &str, message: impl Into<String>) -> Self {
        ProviderError::InvalidResponse {
            method: method.to_string(),
            message: message.into(),
        }
    }
}

/// Submits transactions and queries chain state.
///
/// Implementations are shared behind `Arc<dyn Provider>` and must not hold
/// per-caller state.
#[async_trait]
pub trait Provider: Send + Sync + fmt::Debug {
    async fn chain_id(&self) -> ProviderResult<u64>;

    /// Accounts the node holds keys for and can sign on behalf of.
    async fn accounts(&self) -> ProviderResult<Vec<Address>>;

    /// Next nonce for `address`, counting pending transactions.
    async fn transaction_count(&self, address: &Address) -> ProviderResult<u64>;

    async fn gas_price(&self) -> ProviderResult<BigUint>;

    async fn estimate_gas(&self, tx: &TransactionRequest) -> ProviderResult<u64>;

    /// Submits an unsigned transaction for the node to sign with `tx.from`.
    async fn send_transaction(&self, tx: &TransactionRequest) -> ProviderResult<TxHash>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> ProviderResult<TxHash>;

    /// Executes `tx` against the latest state without submitting it.
    async fn call(&self, tx: &TransactionRequest) -> ProviderResult<Bytes>;

    async fn get_transaction(&self, hash: &TxHash) -> ProviderResult<Option<TransactionInfo>>;

    /// `None` until the transaction is included in a block.
    async fn get_transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>>;

    async fn get_code(&self, address: &Address) -> ProviderResult<Bytes>;

    async fn block_number(&self) -> ProviderResult<u64>;
}
