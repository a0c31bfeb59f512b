use crate::utility::quantity;
use ledgerkit_core::{Address, Bytes, ExecutionStatus, Log, TransactionReceipt, TxHash, H256};
use serde::Deserialize;

/// One entry of a receipt's `logs`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<H256>,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default, deserialize_with = "quantity::option::deserialize")]
    pub log_index: Option<u64>,
    #[serde(default)]
    pub transaction_hash: Option<TxHash>,
    #[serde(default, deserialize_with = "quantity::option::deserialize")]
    pub block_number: Option<u64>,
}

impl From<RpcLog> for Log {
    fn from(log: RpcLog) -> Self {
        Log {
            address: log.address,
            topics: log.topics,
            data: log.data,
            log_index: log.log_index,
            transaction_hash: log.transaction_hash,
            block_number: log.block_number,
        }
    }
}

/// Result of `eth_getTransactionReceipt`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: TxHash,
    /// Some nodes return receipts for pending transactions with a null block.
    #[serde(default)]
    pub block_hash: Option<H256>,
    #[serde(default, deserialize_with = "quantity::option::deserialize")]
    pub block_number: Option<u64>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(deserialize_with = "quantity::deserialize")]
    pub gas_used: u64,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
    /// Absent on receipts that predate status codes; those carry a state root.
    #[serde(default, deserialize_with = "quantity::option::deserialize")]
    pub status: Option<u64>,
}

impl RpcReceipt {
    /// Converts to the core model, or `None` while the block is unknown.
    pub fn into_included(self) -> Option<TransactionReceipt> {
        let block_hash = self.block_hash?;
        let block_number = self.block_number?;
        Some(TransactionReceipt {
            transaction_hash: self.transaction_hash,
            block_hash,
            block_number,
            from: self.from,
            to: self.to,
            contract_address: self.contract_address,
            gas_used: self.gas_used,
            logs: self.logs.into_iter().map(Log::from).collect(),
            status: self
                .status
                .map(ExecutionStatus::from_receipt_status)
                .unwrap_or(ExecutionStatus::Success),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn receipt_json(block_hash: serde_json::Value, status: &str) -> serde_json::Value {
        json!({
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "blockHash": block_hash,
            "blockNumber": "0x5",
            "from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
            "to": "0xf02c1c8e6114b1dbe8937a39260b5b0a374432bb",
            "contractAddress": null,
            "gasUsed": "0x5208",
            "status": status,
            "logs": [{
                "address": "0xf02c1c8e6114b1dbe8937a39260b5b0a374432bb",
                "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
                "data": "0x",
                "logIndex": "0x0",
                "blockNumber": "0x5"
            }]
        })
    }

    #[test]
    fn included_receipt_converts() {
        let raw: RpcReceipt = serde_json::from_value(receipt_json(
            json!("0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2"),
            "0x1",
        ))
        .unwrap();
        let receipt = raw.into_included().unwrap();
        assert_eq!(receipt.block_number, 5);
        assert_eq!(receipt.gas_used, 21_000);
        assert_eq!(receipt.status, ExecutionStatus::Success);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].log_index, Some(0));
    }

    #[test]
    fn reverted_receipt_reports_failure() {
        let raw: RpcReceipt = serde_json::from_value(receipt_json(
            json!("0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2"),
            "0x0",
        ))
        .unwrap();
        assert_eq!(raw.into_included().unwrap().status, ExecutionStatus::Failed);
    }

    #[test]
    fn receipt_without_block_is_not_included() {
        let raw: RpcReceipt =
            serde_json::from_value(receipt_json(serde_json::Value::Null, "0x1")).unwrap();
        assert!(raw.into_included().is_none());
    }
}
