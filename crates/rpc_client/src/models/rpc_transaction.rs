use crate::utility::quantity;
use ledgerkit_core::{Address, Bytes, TransactionInfo, TxHash, H256};
use num_bigint::BigUint;
use serde::Deserialize;

/// Result of `eth_getTransactionByHash`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: TxHash,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(deserialize_with = "quantity::deserialize")]
    pub nonce: u64,
    #[serde(default)]
    pub input: Bytes,
    #[serde(deserialize_with = "quantity::big::deserialize")]
    pub value: BigUint,
    #[serde(deserialize_with = "quantity::deserialize")]
    pub gas: u64,
    #[serde(default)]
    pub block_hash: Option<H256>,
    #[serde(default, deserialize_with = "quantity::option::deserialize")]
    pub block_number: Option<u64>,
}

impl From<RpcTransaction> for TransactionInfo {
    fn from(tx: RpcTransaction) -> Self {
        TransactionInfo {
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            nonce: tx.nonce,
            input: tx.input,
            value: tx.value,
            gas: tx.gas,
            block_hash: tx.block_hash,
            block_number: tx.block_number,
        }
    }
}
