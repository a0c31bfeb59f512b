//! Transaction, log and receipt models as reported by the network.

use crate::primitives::{Address, Bytes, TxHash, H256};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields of a transaction before signing. Unset fields are filled by the
/// signer (nonce, gas price) or the node (gas).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Option<Address>,
    /// `None` creates a contract from `data`.
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: Option<BigUint>,
    pub gas: Option<u64>,
    pub gas_price: Option<BigUint>,
    pub nonce: Option<u64>,
}

impl TransactionRequest {
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn deploy(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn value(mut self, value: BigUint) -> Self {
        self.value = Some(value);
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn gas_price(mut self, gas_price: BigUint) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn is_deployment(&self) -> bool {
        self.to.is_none()
    }
}

/// A transaction as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    pub hash: TxHash,
    pub from: Address,
    pub to: Option<Address>,
    pub nonce: u64,
    pub input: Bytes,
    pub value: BigUint,
    pub gas: u64,
    /// Set once the transaction is included.
    pub block_hash: Option<H256>,
    pub block_number: Option<u64>,
}

impl TransactionInfo {
    pub fn is_pending(&self) -> bool {
        self.block_hash.is_none()
    }
}

/// An event log emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Bytes,
    pub log_index: Option<u64>,
    pub transaction_hash: Option<TxHash>,
    pub block_number: Option<u64>,
}

/// Outcome of executing an included transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
}

impl ExecutionStatus {
    /// Maps the receipt `status` field (`1` success, `0` failure).
    pub fn from_receipt_status(status: u64) -> Self {
        if status == 1 {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        }
    }

    /// Harness status code: `0` on success, non-zero on failure.
    pub fn code(&self) -> u8 {
        match self {
            ExecutionStatus::Success => 0,
            ExecutionStatus::Failed => 1,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "success"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_hash: H256,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    pub logs: Vec<Log>,
    pub status: ExecutionStatus,
}
