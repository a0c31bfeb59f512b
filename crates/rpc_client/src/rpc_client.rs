use crate::error::RpcError;
use crate::models::{RpcReceipt, RpcRequest, RpcResponse, RpcTransaction};
use crate::utility::{parse_quantity, parse_u64_quantity, transaction_request_to_json};
use async_trait::async_trait;
use ledgerkit_config::RpcSettings;
use ledgerkit_core::{
    Address, Bytes, Provider, ProviderError, ProviderResult, TransactionInfo, TransactionReceipt,
    TransactionRequest, TxHash,
};
use num_bigint::BigUint;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// JSON-RPC client for an Ethereum-style node
#[derive(Debug)]
pub struct RpcClient {
    base_address: Url,
    http_client: Client,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: &str) -> Result<Self, RpcError> {
        let base_address = Url::parse(url).map_err(|e| RpcError::InvalidUrl(e.to_string()))?;
        let http_client = Client::builder()
            .build()
            .map_err(|e| RpcError::Http(e.to_string()))?;
        Ok(Self::with_client(http_client, base_address))
    }

    /// Builds a client from the `[rpc]` settings section, applying the
    /// per-request timeout.
    pub fn from_settings(settings: &RpcSettings) -> Result<Self, RpcError> {
        let base_address =
            Url::parse(&settings.url).map_err(|e| RpcError::InvalidUrl(e.to_string()))?;
        let http_client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| RpcError::Http(e.to_string()))?;
        Ok(Self::with_client(http_client, base_address))
    }

    /// Creates a client over an existing HTTP client
    pub fn with_client(client: Client, url: Url) -> Self {
        Self {
            base_address: url,
            http_client: client,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &Url {
        &self.base_address
    }

    fn as_rpc_request(&self, method: &str, params: Vec<Value>) -> RpcRequest {
        RpcRequest::new(self.next_id.fetch_add(1, Ordering::Relaxed), method, params)
    }

    /// Sends a request and returns the raw response envelope
    pub async fn send_async(&self, request: RpcRequest) -> Result<RpcResponse, RpcError> {
        trace!(method = %request.method, id = request.id, "sending rpc request");
        let response = self
            .http_client
            .post(self.base_address.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Http(e.to_string()))?;

        let status = response.status();
        let content = response
            .text()
            .await
            .map_err(|e| RpcError::Http(format!("Failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(RpcError::Http(format!("{status}: {content}")));
        }

        serde_json::from_str(&content).map_err(|e| RpcError::Parse(e.to_string()))
    }

    /// Sends a request and returns its `result`, which may be `null`.
    pub async fn rpc_send_async(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = self.as_rpc_request(method, params);
        let response = self.send_async(request).await?;
        if let Some(error) = response.error {
            debug!(method, code = error.code, message = %error.message, "rpc call failed");
            return Err(RpcError::Response {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let result = self.rpc_send_async(method, params).await?;
        serde_json::from_value(result).map_err(|e| RpcError::InvalidResult {
            method: method.to_string(),
            message: e.to_string(),
        })
    }

    async fn request_u64(&self, method: &str, params: Vec<Value>) -> Result<u64, RpcError> {
        let raw: String = self.request(method, params).await?;
        parse_u64_quantity(&raw).map_err(|message| RpcError::InvalidResult {
            method: method.to_string(),
            message,
        })
    }
}

#[async_trait]
impl Provider for RpcClient {
    async fn chain_id(&self) -> ProviderResult<u64> {
        Ok(self.request_u64("eth_chainId", vec![]).await?)
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        Ok(self.request("eth_accounts", vec![]).await?)
    }

    async fn transaction_count(&self, address: &Address) -> ProviderResult<u64> {
        let params = vec![Value::String(address.to_string()), Value::from("pending")];
        Ok(self.request_u64("eth_getTransactionCount", params).await?)
    }

    async fn gas_price(&self) -> ProviderResult<BigUint> {
        let raw: String = self.request("eth_gasPrice", vec![]).await?;
        parse_quantity(&raw).map_err(|message| ProviderError::invalid_response("eth_gasPrice", message))
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> ProviderResult<u64> {
        let params = vec![transaction_request_to_json(tx)];
        Ok(self.request_u64("eth_estimateGas", params).await?)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> ProviderResult<TxHash> {
        let params = vec![transaction_request_to_json(tx)];
        Ok(self.request("eth_sendTransaction", params).await?)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> ProviderResult<TxHash> {
        let params = vec![Value::String(format!("0x{}", hex::encode(raw)))];
        Ok(self.request("eth_sendRawTransaction", params).await?)
    }

    async fn call(&self, tx: &TransactionRequest) -> ProviderResult<Bytes> {
        let params = vec![transaction_request_to_json(tx), Value::from("latest")];
        Ok(self.request("eth_call", params).await?)
    }

    async fn get_transaction(&self, hash: &TxHash) -> ProviderResult<Option<TransactionInfo>> {
        let params = vec![Value::String(hash.to_string())];
        let tx: Option<RpcTransaction> = self.request("eth_getTransactionByHash", params).await?;
        Ok(tx.map(TransactionInfo::from))
    }

    async fn get_transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>> {
        let params = vec![Value::String(hash.to_string())];
        let receipt: Option<RpcReceipt> =
            self.request("eth_getTransactionReceipt", params).await?;
        Ok(receipt.and_then(RpcReceipt::into_included))
    }

    async fn get_code(&self, address: &Address) -> ProviderResult<Bytes> {
        let params = vec![Value::String(address.to_string()), Value::from("latest")];
        Ok(self.request("eth_getCode", params).await?)
    }

    async fn block_number(&self) -> ProviderResult<u64> {
        Ok(self.request_u64("eth_blockNumber", vec![]).await?)
    }
}
