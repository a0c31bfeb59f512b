//! Transaction handles, submission overrides and confirmed receipts.

use ledgerkit_config::TransactionDefaults;
use ledgerkit_core::{
    Abi, Address, Bytes, ExecutionStatus, Log, TransactionReceipt, TransactionRequest, TxHash,
    H256,
};
use num_bigint::BigUint;

/// A submitted transaction awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub from: Address,
    /// `None` for deployments.
    pub to: Option<Address>,
    /// Set when the caller fixed the nonce.
    pub nonce: Option<u64>,
    pub data: Bytes,
}

/// Per-call fields that take precedence over configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOverrides {
    pub gas: Option<u64>,
    pub gas_price: Option<BigUint>,
    pub value: Option<BigUint>,
    pub nonce: Option<u64>,
}

impl TransactionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn gas_price(mut self, gas_price: impl Into<BigUint>) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    pub fn value(mut self, value: impl Into<BigUint>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub(crate) fn apply(
        &self,
        mut tx: TransactionRequest,
        defaults: &TransactionDefaults,
    ) -> TransactionRequest {
        tx.gas = self.gas.or(defaults.gas_limit);
        tx.gas_price = self
            .gas_price
            .clone()
            .or_else(|| defaults.gas_price.map(BigUint::from));
        tx.value = self.value.clone();
        tx.nonce = self.nonce;
        tx
    }
}

/// A log matched to an event declared in the contract interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptEvent {
    pub name: String,
    pub signature: String,
    pub address: Address,
    pub log_index: Option<u64>,
    pub topics: Vec<H256>,
    pub data: Bytes,
}

/// The confirmed outcome of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_hash: H256,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    pub logs: Vec<Log>,
    pub events: Vec<ReceiptEvent>,
    pub status: ExecutionStatus,
}

impl Receipt {
    /// Labels `receipt.logs` with the events of `abi`. Logs of other
    /// contracts or unknown topics stay in `logs` only.
    pub fn new(receipt: TransactionReceipt, abi: &Abi) -> Self {
        let events = receipt
            .logs
            .iter()
            .filter_map(|log| {
                let event = abi.event_for_topic(log.topics.first()?)?;
                Some(ReceiptEvent {
                    name: event.name.clone(),
                    signature: event.signature().ok()?,
                    address: log.address,
                    log_index: log.log_index,
                    topics: log.topics.clone(),
                    data: log.data.clone(),
                })
            })
            .collect();

        Self {
            transaction_hash: receipt.transaction_hash,
            block_hash: receipt.block_hash,
            block_number: receipt.block_number,
            from: receipt.from,
            to: receipt.to,
            contract_address: receipt.contract_address,
            gas_used: receipt.gas_used,
            logs: receipt.logs,
            events,
            status: receipt.status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn event(&self, name: &str) -> Option<&ReceiptEvent> {
        self.events.iter().find(|event| event.name == name)
    }
}
