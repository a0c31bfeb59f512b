use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    #[serde(rename = "jsonrpc")]
    pub json_rpc: String,

    pub id: u64,

    pub method: String,

    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            json_rpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// Error object of a failed call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcResponseError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC 2.0 response envelope.
///
/// `result` is `None` both when the node returned `null` (e.g. an unknown
/// transaction) and when it returned an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
    #[serde(rename = "jsonrpc", default)]
    pub json_rpc: String,

    #[serde(default)]
    pub id: Value,

    #[serde(default)]
    pub result: Option<Value>,

    #[serde(default)]
    pub error: Option<RpcResponseError>,
}
