use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use broadcast::{BroadcastConfig, BroadcastDispatcher, Chain, DuplicateSignal, ErrorKind};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOLANA_TX: [u8; 16] = [
    1, 88, 12, 200, 7, 0, 0, 3, 45, 61, 250, 9, 14, 77, 128, 255,
];

fn urls_for(predicate: fn(&Chain) -> bool, uri: &str) -> HashMap<Chain, String> {
    Chain::ALL
        .iter()
        .filter(|chain| predicate(chain))
        .map(|chain| (*chain, uri.to_string()))
        .collect()
}

/// Every family pointed at the same mock server
fn dispatcher_for(server: &MockServer) -> BroadcastDispatcher {
    let uri = server.uri();
    BroadcastDispatcher::new()
        .with_evm(urls_for(Chain::is_evm, &uri))
        .with_utxo(uri.clone())
        .with_solana(uri.clone())
        .with_cosmos(urls_for(Chain::is_cosmos, &uri))
        .with_ton(uri.clone())
        .with_polkadot(uri.clone())
        .with_ripple(uri.clone())
        .with_sui(uri.clone())
        .with_tron(uri)
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message }
    }))
}

// EVM

#[tokio::test]
async fn test_evm_returns_node_hash_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_sendRawTransaction" })))
        .respond_with(rpc_result(json!("0xabc123")))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let tx_hash = dispatcher
        .broadcast_raw_tx("Ethereum", "02f86b0180843b9aca00")
        .await
        .unwrap();

    assert_eq!(tx_hash, "0xabc123");
    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["params"][0], "0x02f86b0180843b9aca00");
}

#[tokio::test]
async fn test_evm_duplicate_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_error(-32000, "already known"))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher
        .broadcast_raw_tx("arbitrum", "0x02f86b0180843b9aca00")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    assert!(err.possibly_already_submitted());
    assert!(err.message().contains("hash cannot be recovered"));
}

#[tokio::test]
async fn test_evm_other_rejections_are_not_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_error(-32000, "insufficient funds for gas * price + value"))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher
        .broadcast(Chain::Polygon, "02f86b0180843b9aca00")
        .await
        .unwrap_err();

    assert!(!err.possibly_already_submitted());
    assert_eq!(err.message(), "insufficient funds for gas * price + value");
}

#[tokio::test]
async fn test_evm_invalid_hex_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0xabc123")))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher.broadcast(Chain::Base, "0xnothex").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    assert!(!err.possibly_already_submitted());
}

// UTXO

#[tokio::test]
async fn test_utxo_success_strips_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bitcoin/push/transaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "transaction_hash": "f3e1c2" },
            "context": { "code": 200 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let txid = dispatcher.broadcast_raw_tx("btc", "0x0100000001ab").await.unwrap();

    assert_eq!(txid, "f3e1c2");
    assert_eq!(request_bodies(&server).await[0], json!({ "data": "0100000001ab" }));
}

#[tokio::test]
async fn test_utxo_already_known_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/litecoin/push/transaction"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": null,
            "context": { "error": "already known" }
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher.broadcast(Chain::Litecoin, "0100000001ab").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    assert!(err.possibly_already_submitted());
    assert_eq!(err.message(), "already known");
}

#[tokio::test]
async fn test_utxo_unclassified_error_uses_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dogecoin/push/transaction"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher.broadcast(Chain::Dogecoin, "0100000001ab").await.unwrap_err();

    assert!(!err.possibly_already_submitted());
    assert_eq!(err.message(), "upstream unavailable");
}

#[tokio::test]
async fn test_transport_failure_is_wrapped_with_cause() {
    use std::error::Error as _;

    // nothing listens on port 1
    let dispatcher = BroadcastDispatcher::new().with_utxo("http://127.0.0.1:1".to_string());
    let err = dispatcher.broadcast(Chain::Dash, "0100000001ab").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    assert!(err.message().contains("Failed to reach Dash push endpoint"));
    assert!(err.source().is_some());
}

// Solana

#[tokio::test]
async fn test_solana_base58_and_base64_send_identical_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "sendTransaction" })))
        .respond_with(rpc_result(json!(
            "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW"
        )))
        .expect(2)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let base58 = bs58::encode(SOLANA_TX).into_string();
    let base64 = BASE64_STANDARD.encode(SOLANA_TX);
    assert!(base64.contains('='));

    for payload in [base58, base64] {
        let signature = dispatcher.broadcast(Chain::Solana, &payload).await.unwrap();
        assert_eq!(
            signature,
            "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW"
        );
    }

    let bodies = request_bodies(&server).await;
    let expected = BASE64_STANDARD.encode(SOLANA_TX);
    for body in &bodies {
        assert_eq!(body["params"][0], expected.as_str());
        assert_eq!(body["params"][1]["skipPreflight"], false);
        assert_eq!(body["params"][1]["preflightCommitment"], "confirmed");
        assert_eq!(body["params"][1]["maxRetries"], 3);
    }
}

#[tokio::test]
async fn test_solana_already_processed_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_error(
            -32002,
            "Transaction simulation failed: This transaction has already been processed",
        ))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher
        .broadcast_raw_tx("sol", &bs58::encode(SOLANA_TX).into_string())
        .await
        .unwrap_err();

    assert!(err.possibly_already_submitted());
    assert_eq!(err.duplicate_signal(), Some(DuplicateSignal::AlreadySubmitted));
}

// Cosmos

#[tokio::test]
async fn test_cosmos_json_and_raw_inputs_send_identical_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cosmos/tx/v1beta1/txs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tx_response": { "height": "0", "txhash": "A1B2C3D4", "code": 0, "raw_log": "[]" }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let tx_bytes = BASE64_STANDARD.encode(b"\x0a\x94\x01\x0a\x91\x01signed-cosmos-tx");
    let envelope = json!({ "tx_bytes": tx_bytes }).to_string();

    assert_eq!(dispatcher.broadcast(Chain::ThorChain, &envelope).await.unwrap(), "A1B2C3D4");
    assert_eq!(dispatcher.broadcast(Chain::ThorChain, &tx_bytes).await.unwrap(), "A1B2C3D4");

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["tx_bytes"], tx_bytes.as_str());
    assert_eq!(bodies[0]["mode"], "BROADCAST_MODE_SYNC");
}

#[tokio::test]
async fn test_cosmos_duplicate_and_sequence_signals_differ() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cosmos/tx/v1beta1/txs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tx_response": { "txhash": "A1B2", "codespace": "sdk", "code": 19, "raw_log": "tx already exists in cache" }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cosmos/tx/v1beta1/txs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tx_response": {
                "txhash": "A1B2",
                "codespace": "sdk",
                "code": 32,
                "raw_log": "account sequence mismatch, expected 12, got 11: incorrect account sequence"
            }
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let tx_bytes = BASE64_STANDARD.encode(b"cosmos-tx");

    let duplicate = dispatcher.broadcast(Chain::Osmosis, &tx_bytes).await.unwrap_err();
    assert!(duplicate.possibly_already_submitted());
    assert_eq!(duplicate.duplicate_signal(), Some(DuplicateSignal::AlreadySubmitted));

    let sequence = dispatcher.broadcast(Chain::Osmosis, &tx_bytes).await.unwrap_err();
    assert!(sequence.possibly_already_submitted());
    assert_eq!(sequence.duplicate_signal(), Some(DuplicateSignal::SequenceConflict));
}

// TON

#[tokio::test]
async fn test_ton_returns_hash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sendBocReturnHash"))
        .and(body_partial_json(json!({ "boc": "te6cckEBAQEAAgAAAEysuc0=" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "@type": "raw.extMessageInfo", "hash": "hE7Z1aRk9dVq2N1n0vTt3gkWg6S8J3k+f3lQ1pT0pxw=" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let hash = dispatcher
        .broadcast_raw_tx("ton", "te6cckEBAQEAAgAAAEysuc0=")
        .await
        .unwrap();
    assert_eq!(hash, "hE7Z1aRk9dVq2N1n0vTt3gkWg6S8J3k+f3lQ1pT0pxw=");
}

#[tokio::test]
async fn test_ton_duplicate_message_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sendBocReturnHash"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "ok": false,
            "error": "LITE_SERVER_UNKNOWN: duplicate message",
            "code": 500
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher.broadcast(Chain::Ton, "te6cckEBAQEAAgAAAEysuc0=").await.unwrap_err();
    assert!(err.possibly_already_submitted());
}

// Polkadot

#[tokio::test]
async fn test_polkadot_submits_prefixed_extrinsic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "author_submitExtrinsic" })))
        .respond_with(rpc_result(json!("0x5d1e3c")))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let hash = dispatcher.broadcast(Chain::Polkadot, "45028400d4").await.unwrap();

    assert_eq!(hash, "0x5d1e3c");
    assert_eq!(request_bodies(&server).await[0]["params"], json!(["0x45028400d4"]));
}

#[tokio::test]
async fn test_polkadot_rpc_error_is_generic_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_error(1010, "Invalid Transaction"))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher.broadcast(Chain::Polkadot, "0x45028400d4").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    assert!(!err.possibly_already_submitted());
    assert_eq!(err.message(), "Invalid Transaction");
}

// Ripple

#[tokio::test]
async fn test_ripple_reads_tx_json_hash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "submit" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "status": "success",
                "engine_result": "tesSUCCESS",
                "engine_result_message": "The transaction was applied.",
                "tx_json": { "hash": "C53ECF838647FA5A4C780377025FEC7999AB4182590510CA461444B207AB74A9" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let hash = dispatcher.broadcast_raw_tx("xrp", "0x1200002280").await.unwrap();

    assert_eq!(hash, "C53ECF838647FA5A4C780377025FEC7999AB4182590510CA461444B207AB74A9");
    assert_eq!(
        request_bodies(&server).await[0]["params"][0]["tx_blob"],
        "1200002280"
    );
}

#[tokio::test]
async fn test_ripple_past_seq_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "status": "success",
                "engine_result": "tefPAST_SEQ",
                "engine_result_message": "This sequence number has already passed."
            }
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher.broadcast(Chain::Ripple, "1200002280").await.unwrap_err();

    assert!(err.possibly_already_submitted());
    assert_eq!(err.duplicate_signal(), Some(DuplicateSignal::SequenceConflict));
}

// Sui

#[tokio::test]
async fn test_sui_returns_digest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "sui_executeTransactionBlock" })))
        .respond_with(rpc_result(json!({
            "digest": "3Bxs4h24hBtQy9rwXNwKGBhhD4h5hyPuY4qmgTtAKUr4",
            "effects": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let payload = json!({ "unsignedTx": "AAACAAgA", "signature": "AKD4XdltkC" }).to_string();
    let digest = dispatcher.broadcast(Chain::Sui, &payload).await.unwrap();

    assert_eq!(digest, "3Bxs4h24hBtQy9rwXNwKGBhhD4h5hyPuY4qmgTtAKUr4");
    let params = &request_bodies(&server).await[0]["params"];
    assert_eq!(params[0], "AAACAAgA");
    assert_eq!(params[1], json!(["AKD4XdltkC"]));
}

#[tokio::test]
async fn test_sui_missing_fields_never_reach_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({ "digest": "unused" })))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    for payload in [
        json!({ "signature": "AKD4XdltkC" }).to_string(),
        json!({ "unsignedTx": "AAACAAgA" }).to_string(),
    ] {
        let err = dispatcher.broadcast(Chain::Sui, &payload).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
        assert!(!err.possibly_already_submitted());
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sui_already_executed_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_error(-32002, "Transaction already executed"))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let payload = json!({ "unsignedTx": "AAACAAgA", "signature": "AKD4XdltkC" }).to_string();
    let err = dispatcher.broadcast(Chain::Sui, &payload).await.unwrap_err();
    assert!(err.possibly_already_submitted());
}

// Tron

#[tokio::test]
async fn test_tron_returns_txid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wallet/broadcasttransaction"))
        .and(body_partial_json(json!({ "txID": "77ddfa70" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "txid": "77ddfa70"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let payload = json!({
        "txID": "77ddfa70",
        "raw_data_hex": "0a02",
        "signature": ["ab"]
    })
    .to_string();
    assert_eq!(dispatcher.broadcast_raw_tx("trx", &payload).await.unwrap(), "77ddfa70");
}

#[tokio::test]
async fn test_tron_success_without_txid_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wallet/broadcasttransaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": "SUCCESS" })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher.broadcast(Chain::Tron, r#"{"txID":"77dd"}"#).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    assert!(err.message().contains("no transaction id returned"));
    assert!(!err.possibly_already_submitted());
}

#[tokio::test]
async fn test_tron_duplicate_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wallet/broadcasttransaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "DUP_TRANSACTION_ERROR",
            "txid": "77dd",
            "message": hex::encode("dup transaction")
        })))
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher.broadcast(Chain::Tron, r#"{"txID":"77dd"}"#).await.unwrap_err();
    assert!(err.possibly_already_submitted());
    assert_eq!(err.message(), "DUP_TRANSACTION_ERROR: dup transaction");
}

#[tokio::test]
async fn test_tron_non_object_payload_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    for payload in ["not json", "[1,2,3]"] {
        let err = dispatcher.broadcast(Chain::Tron, payload).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    }
}

// Dispatch

#[tokio::test]
async fn test_unknown_chain_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0xabc123")))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher_for(&server);
    let err = dispatcher.broadcast_raw_tx("not-a-chain", "02f8").await.unwrap_err();

    assert!(err.is_unsupported_chain());
    assert!(!err.possibly_already_submitted());
}

#[tokio::test]
async fn test_unregistered_family_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0xabc123")))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = BroadcastDispatcher::new().with_evm(urls_for(Chain::is_evm, &server.uri()));
    let err = dispatcher.broadcast_raw_tx("cosmos", "AAAA").await.unwrap_err();

    assert!(err.is_unsupported_chain());
    assert!(err.to_string().contains("EVM"));
}

#[tokio::test]
async fn test_unconfigured_evm_chain_lists_families() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!("0xabc123")))
        .expect(0)
        .mount(&server)
        .await;

    let mut urls = HashMap::new();
    urls.insert(Chain::Ethereum, server.uri());
    let dispatcher = BroadcastDispatcher::new()
        .with_evm(urls)
        .with_utxo(server.uri());

    let err = dispatcher.broadcast_raw_tx("base", "02f86b01").await.unwrap_err();
    assert!(err.is_unsupported_chain());
    assert!(err.message().contains("configured chains: Ethereum"));
    assert!(err.message().contains("supported families: EVM, UTXO"));
}

#[tokio::test]
async fn test_configured_timeout_bounds_every_family() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "sendTransaction" })))
        .respond_with(rpc_result(json!("sig")).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "author_submitExtrinsic" })))
        .respond_with(rpc_result(json!("0x5d1e3c")).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = BroadcastConfig {
        solana_rpc_url: server.uri(),
        polkadot_rpc_url: server.uri(),
        request_timeout_secs: 1,
        ..BroadcastConfig::default()
    };
    let dispatcher = BroadcastDispatcher::from_config(&config).unwrap();

    let started = Instant::now();
    let err = dispatcher
        .broadcast(Chain::Solana, &bs58::encode(SOLANA_TX).into_string())
        .await
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_millis(2500));
    assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    assert!(!err.possibly_already_submitted());

    let started = Instant::now();
    let err = dispatcher.broadcast(Chain::Polkadot, "45028400d4").await.unwrap_err();
    assert!(started.elapsed() < Duration::from_millis(2500));
    assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    // the transport error is reported once, not repeated by each wrapper
    assert_eq!(err.message().matches(" for url (").count(), 1);
}

#[tokio::test]
async fn test_concurrent_broadcasts_are_independent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bitcoin/push/transaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "transaction_hash": "btc-hash" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_sendRawTransaction" })))
        .respond_with(rpc_result(json!("0xeth-hash")))
        .mount(&server)
        .await;

    let dispatcher = Arc::new(dispatcher_for(&server));
    let mut handles = Vec::new();
    for i in 0..8 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            let (chain, expected) = if i % 2 == 0 {
                (Chain::Bitcoin, "btc-hash")
            } else {
                (Chain::Ethereum, "0xeth-hash")
            };
            let tx_id = dispatcher.broadcast(chain, "0100000001ab").await.unwrap();
            assert_eq!(tx_id, expected);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(server.received_requests().await.unwrap().len(), 8);
}
