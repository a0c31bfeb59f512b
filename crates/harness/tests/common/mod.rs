//! In-memory development network for harness tests.
//!
//! `DevNetwork` accepts node-signed and raw-signed transactions, assigns
//! each one a block and makes its receipt visible after a configurable
//! inclusion delay. Individual submissions can be rejected, withheld,
//! reverted or made to emit an event.

#![allow(dead_code)]

use anyhow::{bail, ensure, Context};
use async_trait::async_trait;
use ledgerkit_config::HarnessSettings;
use ledgerkit_core::*;
use ledgerkit_harness::{Deployer, HistoryStore};
use ledgerkit_telemetry::{init_logging, LogConfig};
use ledgerkit_wallets::{LegacyTransaction, ManagedAccount, Signature};
use num_bigint::BigUint;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const CHAIN_ID: u64 = 1337;
pub const GAS_PRICE: u64 = 1_000_000_000;

#[derive(Debug)]
struct Submitted {
    info: TransactionInfo,
    receipt: TransactionReceipt,
    /// `None` while withheld.
    visible_at: Option<Instant>,
}

impl Submitted {
    fn is_visible(&self) -> bool {
        self.visible_at.is_some_and(|at| Instant::now() >= at)
    }
}

#[derive(Debug, Default)]
struct State {
    nonces: HashMap<Address, u64>,
    code: HashMap<Address, Bytes>,
    submitted: HashMap<TxHash, Submitted>,
    block_number: u64,
    next_delays: VecDeque<Duration>,
    withhold_next: usize,
    reject_next: Option<String>,
    reverting: HashSet<[u8; 4]>,
    revert_deployments: bool,
    deploy_without_code: bool,
    events: HashMap<[u8; 4], H256>,
    call_results: HashMap<[u8; 4], Bytes>,
    fail_receipt_queries: bool,
}

struct Inclusion {
    from: Address,
    to: Option<Address>,
    nonce: Option<u64>,
    value: BigUint,
    gas: u64,
    data: Bytes,
    hash: TxHash,
}

#[derive(Debug)]
pub struct DevNetwork {
    accounts: Vec<Address>,
    default_delay: Duration,
    state: Mutex<State>,
    requests: AtomicUsize,
}

impl DevNetwork {
    pub fn new(accounts: usize) -> Self {
        let accounts = (0..accounts)
            .map(|i| Address::new([0x10 + i as u8; ADDRESS_SIZE]))
            .collect();
        Self {
            accounts,
            default_delay: Duration::from_millis(5),
            state: Mutex::new(State::default()),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn managed_accounts(&self) -> Vec<Address> {
        self.accounts.clone()
    }

    /// Provider calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn delay_next(&self, delay: Duration) {
        self.state.lock().next_delays.push_back(delay);
    }

    /// The next submission is accepted but never included until released.
    pub fn withhold_next(&self) {
        self.state.lock().withhold_next += 1;
    }

    pub fn release(&self, hash: &TxHash) {
        if let Some(submitted) = self.state.lock().submitted.get_mut(hash) {
            submitted.visible_at = Some(Instant::now());
        }
    }

    pub fn reject_next(&self, message: &str) {
        self.state.lock().reject_next = Some(message.to_string());
    }

    pub fn revert_on(&self, selector: [u8; 4]) {
        self.state.lock().reverting.insert(selector);
    }

    pub fn revert_deployments(&self) {
        self.state.lock().revert_deployments = true;
    }

    pub fn deploy_without_code(&self) {
        self.state.lock().deploy_without_code = true;
    }

    pub fn emit_on(&self, selector: [u8; 4], topic: H256) {
        self.state.lock().events.insert(selector, topic);
    }

    pub fn set_call_result(&self, selector: [u8; 4], result: Vec<u8>) {
        self.state.lock().call_results.insert(selector, result.into());
    }

    pub fn fail_receipt_queries(&self, fail: bool) {
        self.state.lock().fail_receipt_queries = fail;
    }

    pub fn sender_of(&self, hash: &TxHash) -> Option<Address> {
        self.state.lock().submitted.get(hash).map(|s| s.info.from)
    }

    pub fn code_at(&self, address: &Address) -> Option<Bytes> {
        self.state.lock().code.get(address).cloned()
    }

    fn touch(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn include(&self, tx: Inclusion) -> ProviderResult<TxHash> {
        let mut state = self.state.lock();
        if let Some(message) = state.reject_next.take() {
            return Err(ProviderError::Rpc {
                code: -32000,
                message,
            });
        }

        let expected = state.nonces.get(&tx.from).copied().unwrap_or(0);
        let nonce = tx.nonce.unwrap_or(expected);
        if nonce != expected {
            return Err(ProviderError::Rpc {
                code: -32000,
                message: format!("nonce mismatch: expected {expected}, got {nonce}"),
            });
        }
        state.nonces.insert(tx.from, expected + 1);
        state.block_number += 1;
        let block_number = state.block_number;

        let selector: Option<[u8; 4]> = tx.data.get(..4).and_then(|s| s.try_into().ok());
        let (status, contract_address, logs) = match tx.to {
            None => {
                let address = Address::contract_address(&tx.from, nonce);
                if state.revert_deployments {
                    (ExecutionStatus::Failed, Some(address), vec![])
                } else {
                    if !state.deploy_without_code {
                        state.code.insert(address, tx.data.clone());
                    }
                    (ExecutionStatus::Success, Some(address), vec![])
                }
            }
            Some(to) => {
                let reverted = selector.is_some_and(|s| state.reverting.contains(&s));
                let logs = match selector.and_then(|s| state.events.get(&s)) {
                    Some(topic) if !reverted => vec![Log {
                        address: to,
                        topics: vec![*topic],
                        data: Bytes::new(),
                        log_index: Some(0),
                        transaction_hash: Some(tx.hash),
                        block_number: Some(block_number),
                    }],
                    _ => vec![],
                };
                let status = if reverted {
                    ExecutionStatus::Failed
                } else {
                    ExecutionStatus::Success
                };
                (status, None, logs)
            }
        };

        let visible_at = if state.withhold_next > 0 {
            state.withhold_next -= 1;
            None
        } else {
            let delay = state.next_delays.pop_front().unwrap_or(self.default_delay);
            Some(Instant::now() + delay)
        };

        let block_hash = H256::keccak(&block_number.to_be_bytes());
        let submitted = Submitted {
            info: TransactionInfo {
                hash: tx.hash,
                from: tx.from,
                to: tx.to,
                nonce,
                input: tx.data.clone(),
                value: tx.value,
                gas: tx.gas,
                block_hash: Some(block_hash),
                block_number: Some(block_number),
            },
            receipt: TransactionReceipt {
                transaction_hash: tx.hash,
                block_hash,
                block_number,
                from: tx.from,
                to: tx.to,
                contract_address,
                gas_used: 21_000 + 16 * tx.data.len() as u64,
                logs,
                status,
            },
            visible_at,
        };
        state.submitted.insert(tx.hash, submitted);
        Ok(tx.hash)
    }
}

#[async_trait]
impl Provider for DevNetwork {
    async fn chain_id(&self) -> ProviderResult<u64> {
        self.touch();
        Ok(CHAIN_ID)
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        self.touch();
        Ok(self.accounts.clone())
    }

    async fn transaction_count(&self, address: &Address) -> ProviderResult<u64> {
        self.touch();
        Ok(self.state.lock().nonces.get(address).copied().unwrap_or(0))
    }

    async fn gas_price(&self) -> ProviderResult<BigUint> {
        self.touch();
        Ok(BigUint::from(GAS_PRICE))
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> ProviderResult<u64> {
        self.touch();
        Ok(90_000)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> ProviderResult<TxHash> {
        self.touch();
        let from = tx
            .from
            .ok_or_else(|| ProviderError::invalid_response("eth_sendTransaction", "missing from"))?;
        if !self.accounts.contains(&from) {
            return Err(ProviderError::Rpc {
                code: -32000,
                message: format!("unknown account {from}"),
            });
        }
        let nonce = tx
            .nonce
            .unwrap_or_else(|| self.state.lock().nonces.get(&from).copied().unwrap_or(0));
        let mut preimage = from.as_bytes().to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(&tx.data);
        self.include(Inclusion {
            from,
            to: tx.to,
            nonce: tx.nonce,
            value: tx.value.clone().unwrap_or_default(),
            gas: tx.gas.unwrap_or(90_000),
            data: tx.data.clone(),
            hash: H256::keccak(&preimage),
        })
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> ProviderResult<TxHash> {
        self.touch();
        let (tx, from) = decode_signed(raw).map_err(|err| ProviderError::Rpc {
            code: -32602,
            message: format!("invalid raw transaction: {err:#}"),
        })?;
        self.include(Inclusion {
            from,
            to: tx.to,
            nonce: Some(tx.nonce),
            value: tx.value,
            gas: tx.gas,
            data: tx.data,
            hash: H256::keccak(raw),
        })
    }

    async fn call(&self, tx: &TransactionRequest) -> ProviderResult<Bytes> {
        self.touch();
        let selector: Option<[u8; 4]> = tx.data.get(..4).and_then(|s| s.try_into().ok());
        let state = self.state.lock();
        Ok(selector
            .and_then(|s| state.call_results.get(&s).cloned())
            .unwrap_or_default())
    }

    async fn get_transaction(&self, hash: &TxHash) -> ProviderResult<Option<TransactionInfo>> {
        self.touch();
        let state = self.state.lock();
        Ok(state.submitted.get(hash).map(|submitted| {
            let mut info = submitted.info.clone();
            if !submitted.is_visible() {
                info.block_hash = None;
                info.block_number = None;
            }
            info
        }))
    }

    async fn get_transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>> {
        self.touch();
        let state = self.state.lock();
        if state.fail_receipt_queries {
            return Err(ProviderError::Transport("connection reset".to_string()));
        }
        Ok(state
            .submitted
            .get(hash)
            .filter(|submitted| submitted.is_visible())
            .map(|submitted| submitted.receipt.clone()))
    }

    async fn get_code(&self, address: &Address) -> ProviderResult<Bytes> {
        self.touch();
        Ok(self.code_at(address).unwrap_or_default())
    }

    async fn block_number(&self) -> ProviderResult<u64> {
        self.touch();
        Ok(self.state.lock().block_number)
    }
}

enum Rlp {
    Bytes(Vec<u8>),
    List(Vec<Rlp>),
}

impl Rlp {
    fn bytes(&self) -> anyhow::Result<&[u8]> {
        match self {
            Rlp::Bytes(bytes) => Ok(bytes),
            Rlp::List(_) => bail!("expected bytes, found list"),
        }
    }

    fn u64(&self) -> anyhow::Result<u64> {
        let bytes = self.bytes()?;
        ensure!(bytes.len() <= 8, "integer too large");
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    fn word(&self) -> anyhow::Result<[u8; 32]> {
        let bytes = self.bytes()?;
        ensure!(bytes.len() <= 32, "word too large");
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(out)
    }
}

fn split(input: &[u8], len: usize) -> anyhow::Result<(&[u8], &[u8])> {
    ensure!(input.len() >= len, "truncated rlp item");
    Ok(input.split_at(len))
}

fn length_of(bytes: &[u8]) -> usize {
    bytes.iter().fold(0usize, |acc, b| (acc << 8) | usize::from(*b))
}

fn decode_item(input: &[u8]) -> anyhow::Result<(Rlp, &[u8])> {
    let (&prefix, rest) = input.split_first().context("empty rlp input")?;
    match prefix {
        0x00..=0x7f => Ok((Rlp::Bytes(vec![prefix]), rest)),
        0x80..=0xb7 => {
            let (payload, rest) = split(rest, usize::from(prefix - 0x80))?;
            Ok((Rlp::Bytes(payload.to_vec()), rest))
        }
        0xb8..=0xbf => {
            let (len, rest) = split(rest, usize::from(prefix - 0xb7))?;
            let (payload, rest) = split(rest, length_of(len))?;
            Ok((Rlp::Bytes(payload.to_vec()), rest))
        }
        0xc0..=0xf7 => {
            let (payload, rest) = split(rest, usize::from(prefix - 0xc0))?;
            Ok((Rlp::List(decode_items(payload)?), rest))
        }
        _ => {
            let (len, rest) = split(rest, usize::from(prefix - 0xf7))?;
            let (payload, rest) = split(rest, length_of(len))?;
            Ok((Rlp::List(decode_items(payload)?), rest))
        }
    }
}

fn decode_items(mut payload: &[u8]) -> anyhow::Result<Vec<Rlp>> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, rest) = decode_item(payload)?;
        items.push(item);
        payload = rest;
    }
    Ok(items)
}

/// Decodes a signed legacy transaction and recovers its sender.
fn decode_signed(raw: &[u8]) -> anyhow::Result<(LegacyTransaction, Address)> {
    let (item, rest) = decode_item(raw)?;
    ensure!(rest.is_empty(), "trailing bytes after transaction");
    let Rlp::List(fields) = item else {
        bail!("transaction is not a list");
    };
    ensure!(fields.len() == 9, "expected 9 fields, got {}", fields.len());

    let to = match fields[3].bytes()? {
        [] => None,
        bytes => Some(Address::from_slice(bytes)?),
    };
    let v = fields[6].u64()?;
    ensure!(v >= 35, "transaction lacks replay protection");
    let chain_id = (v - 35) / 2;
    ensure!(chain_id == CHAIN_ID, "wrong chain id {chain_id}");

    let tx = LegacyTransaction {
        nonce: fields[0].u64()?,
        gas_price: BigUint::from_bytes_be(fields[1].bytes()?),
        gas: fields[2].u64()?,
        to,
        value: BigUint::from_bytes_be(fields[4].bytes()?),
        data: fields[5].bytes()?.to_vec().into(),
        chain_id,
    };
    let signature = Signature {
        r: fields[7].word()?,
        s: fields[8].word()?,
        recovery_id: ((v - 35) % 2) as u8,
    };
    let from = signature.recover(&tx.signing_hash())?;
    Ok((tx, from))
}

/// Interface of the contract every test deploys.
pub fn ownable_artifact() -> ContractArtifact {
    ContractArtifact::from_value(json!({
        "contractName": "Ownable",
        "abi": [
            {"type": "constructor", "inputs": []},
            {
                "type": "function",
                "name": "owner",
                "inputs": [],
                "outputs": [{"name": "", "type": "address"}],
                "stateMutability": "view"
            },
            {
                "type": "function",
                "name": "transferOwnership",
                "inputs": [{"name": "newOwner", "type": "address"}],
                "outputs": [],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "setValue",
                "inputs": [{"name": "value", "type": "uint256"}],
                "outputs": [],
                "stateMutability": "nonpayable"
            },
            {
                "type": "event",
                "name": "OwnershipTransferred",
                "anonymous": false,
                "inputs": [
                    {"name": "previousOwner", "type": "address", "indexed": true},
                    {"name": "newOwner", "type": "address", "indexed": true}
                ]
            }
        ],
        "bytecode": "0x6080604052348015600f57600080fd5b50"
    }))
    .expect("valid artifact")
}

pub fn selector(artifact: &ContractArtifact, name: &str) -> [u8; 4] {
    artifact.abi.functions_named(name)[0]
        .selector()
        .expect("selector")
}

/// Short polls so tests settle in milliseconds.
pub fn fast_settings() -> HarnessSettings {
    let mut settings = HarnessSettings::default();
    settings.confirmation.poll_interval_ms = 2;
    settings.confirmation.timeout_ms = 5_000;
    settings.confirmation.max_polls = 2_500;
    settings
}

pub fn init_tracing() {
    let _ = init_logging(&LogConfig {
        level: "ledgerkit_harness=debug".to_string(),
        test_writer: true,
        color: false,
        ..LogConfig::default()
    });
}

pub struct TestBed {
    pub network: Arc<DevNetwork>,
    pub history: Arc<HistoryStore>,
    pub deployer: Deployer,
}

impl TestBed {
    pub fn provider(&self) -> Arc<dyn Provider> {
        self.network.clone()
    }

    pub fn accounts(&self) -> Vec<Address> {
        self.network.managed_accounts()
    }

    pub fn action_count(&self) -> usize {
        self.history
            .current_record()
            .map(|record| record.actions.len())
            .unwrap_or(0)
    }
}

/// A network with `accounts` managed accounts, a started history record
/// and a deployer bound to every account.
pub fn test_bed(accounts: usize) -> TestBed {
    test_bed_with(accounts, fast_settings())
}

pub fn test_bed_with(accounts: usize, settings: HarnessSettings) -> TestBed {
    init_tracing();
    let network = Arc::new(DevNetwork::new(accounts));
    let history = Arc::new(HistoryStore::new());
    history.init_history_record();
    let signers = network
        .managed_accounts()
        .into_iter()
        .map(|address| Arc::new(ManagedAccount::new(address)) as Arc<dyn Signer>)
        .collect();
    let deployer = Deployer::new(network.clone(), signers, history.clone(), &settings)
        .expect("deployer");
    TestBed {
        network,
        history,
        deployer,
    }
}
