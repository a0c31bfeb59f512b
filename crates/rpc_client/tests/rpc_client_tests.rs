//! RpcClient tests against a mocked JSON-RPC endpoint

use ledgerkit_core::{Address, ExecutionStatus, Provider, ProviderError, TransactionRequest};
use ledgerkit_rpc_client::RpcClient;
use mockito::{Matcher, Server, ServerGuard};
use std::net::TcpListener;

fn localhost_binding_permitted() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn mock_result(server: &mut ServerGuard, method: &str, result: &str) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#)))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"jsonrpc":"2.0","id":1,"result":{result}}}"#))
        .create()
}

const SENDER: &str = "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d";
const TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

#[tokio::test]
async fn quantities_are_decoded() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let _chain = mock_result(&mut server, "eth_chainId", r#""0x539""#);
    let _block = mock_result(&mut server, "eth_blockNumber", r#""0x1b4""#);
    let _price = mock_result(&mut server, "eth_gasPrice", r#""0x4a817c800""#);

    let client = RpcClient::new(&server.url()).expect("client");
    assert_eq!(client.chain_id().await.unwrap(), 1337);
    assert_eq!(client.block_number().await.unwrap(), 436);
    assert_eq!(
        client.gas_price().await.unwrap(),
        num_bigint::BigUint::from(20_000_000_000u64)
    );
}

#[tokio::test]
async fn nonce_is_requested_against_pending_state() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::Regex(format!(
            r#""method"\s*:\s*"eth_getTransactionCount".*"params"\s*:\s*\[\s*"{SENDER}"\s*,\s*"pending"\s*\]"#
        )))
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x2a"}"#)
        .create();

    let client = RpcClient::new(&server.url()).expect("client");
    let sender: Address = SENDER.parse().unwrap();
    assert_eq!(client.transaction_count(&sender).await.unwrap(), 42);
    mock.assert();
}

#[tokio::test]
async fn accounts_and_node_signed_submission() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let _accounts = mock_result(&mut server, "eth_accounts", &format!(r#"["{SENDER}"]"#));
    let send = server
        .mock("POST", "/")
        .match_body(Matcher::Regex(format!(
            r#""method"\s*:\s*"eth_sendTransaction".*"from"\s*:\s*"{SENDER}""#
        )))
        .with_status(200)
        .with_body(format!(r#"{{"jsonrpc":"2.0","id":2,"result":"{TX_HASH}"}}"#))
        .create();

    let client = RpcClient::new(&server.url()).expect("client");
    let accounts = client.accounts().await.unwrap();
    assert_eq!(accounts, vec![SENDER.parse::<Address>().unwrap()]);

    let tx = TransactionRequest::deploy(vec![0x60, 0x80]).sender(accounts[0]);
    let hash = client.send_transaction(&tx).await.unwrap();
    assert_eq!(hash.to_string(), TX_HASH);
    send.assert();
}

#[tokio::test]
async fn missing_receipt_is_none() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let _receipt = mock_result(&mut server, "eth_getTransactionReceipt", "null");

    let client = RpcClient::new(&server.url()).expect("client");
    let receipt = client
        .get_transaction_receipt(&TX_HASH.parse().unwrap())
        .await
        .unwrap();
    assert!(receipt.is_none());
}

#[tokio::test]
async fn included_receipt_is_parsed() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let body = format!(
        r#"{{
            "transactionHash": "{TX_HASH}",
            "blockHash": "0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2",
            "blockNumber": "0xb",
            "from": "{SENDER}",
            "to": null,
            "contractAddress": "0xf02c1c8e6114b1dbe8937a39260b5b0a374432bb",
            "gasUsed": "0x1d4c0",
            "status": "0x1",
            "logs": []
        }}"#
    );
    let _receipt = mock_result(&mut server, "eth_getTransactionReceipt", &body);

    let client = RpcClient::new(&server.url()).expect("client");
    let receipt = client
        .get_transaction_receipt(&TX_HASH.parse().unwrap())
        .await
        .unwrap()
        .expect("receipt");
    assert_eq!(receipt.block_number, 11);
    assert_eq!(receipt.gas_used, 120_000);
    assert_eq!(receipt.status, ExecutionStatus::Success);
    assert_eq!(
        receipt.contract_address,
        Some("0xf02c1c8e6114b1dbe8937a39260b5b0a374432bb".parse().unwrap())
    );
}

#[tokio::test]
async fn node_errors_become_provider_errors() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"nonce too low"}}"#,
        )
        .create();

    let client = RpcClient::new(&server.url()).expect("client");
    let err = client.send_raw_transaction(&[0xf8, 0x6b]).await.unwrap_err();
    assert_eq!(
        err,
        ProviderError::Rpc {
            code: -32000,
            message: "nonce too low".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_result_is_invalid_response() {
    if !localhost_binding_permitted() {
        return;
    }
    let mut server = Server::new_async().await;
    let _m = mock_result(&mut server, "eth_blockNumber", "12");

    let client = RpcClient::new(&server.url()).expect("client");
    let err = client.block_number().await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse { .. }));
}

#[test]
fn invalid_url_is_rejected() {
    assert!(RpcClient::new("not a url").is_err());
}
