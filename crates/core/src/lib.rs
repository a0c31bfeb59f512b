//! ledgerkit core
//!
//! Shared building blocks for the harness crates:
//! - fixed-size primitives ([`Address`], [`H256`]) and raw [`Bytes`]
//! - Keccak-256 hashing
//! - contract ABI encoding and compiled artifacts
//! - transaction, log and receipt models as reported by the network
//! - the [`Provider`] and [`Signer`] collaborator traits

pub mod abi;
pub mod artifact;
mod error;
pub mod hash;
mod primitives;
pub mod provider;
pub mod rlp;
pub mod signer;
pub mod transaction;

pub use abi::{Abi, AbiError, AbiEvent, AbiFunction, AbiParam, ParamType, Token};
pub use artifact::ContractArtifact;
pub use error::{CoreError, CoreResult};
pub use hash::keccak256;
pub use primitives::{Address, Bytes, H256, TxHash, ADDRESS_SIZE, HASH_SIZE};
pub use provider::{Provider, ProviderError, ProviderResult};
pub use rlp::RlpWriter;
pub use signer::{Signer, SignerError};
pub use transaction::{
    ExecutionStatus, Log, TransactionInfo, TransactionReceipt, TransactionRequest,
};
