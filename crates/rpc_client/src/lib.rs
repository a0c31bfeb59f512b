//! ledgerkit RPC client
//!
//! A JSON-RPC 2.0 client over HTTP for nodes that speak the Ethereum-style
//! `eth_*` method set. [`RpcClient`] implements the core
//! [`Provider`](ledgerkit_core::Provider) trait, so the harness never sees
//! request framing.

mod error;
pub mod models;
mod rpc_client;
mod utility;

pub use error::RpcError;
pub use rpc_client::RpcClient;
pub use utility::{format_quantity, parse_quantity, transaction_request_to_json};

// Re-export commonly used types
pub use models::{RpcLog, RpcReceipt, RpcRequest, RpcResponse, RpcResponseError, RpcTransaction};
