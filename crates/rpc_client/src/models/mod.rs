//! JSON-RPC wire models

mod rpc_receipt;
mod rpc_request;
mod rpc_transaction;

pub use rpc_receipt::{RpcLog, RpcReceipt};
pub use rpc_request::{RpcRequest, RpcResponse, RpcResponseError};
pub use rpc_transaction::RpcTransaction;
