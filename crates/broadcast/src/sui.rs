use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{Chain, ChainFamily, Error};
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;
use crate::jsonrpc::{JsonRpcClient, JsonRpcError};

/// `sui_executeTransactionBlock` against a Sui full node
pub struct SuiBroadcaster {
    rpc: JsonRpcClient,
}

/// Transaction bytes and signature, both base64, as produced by the signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiSignedTx {
    pub unsigned_tx: String,
    pub signature: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuiPayload {
    unsigned_tx: Option<String>,
    signature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResult {
    digest: String,
}

fn required(field: Option<String>, name: &str) -> Result<String, String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("Sui payload is missing {}", name)),
    }
}

/// Checks the payload before anything is sent
pub fn parse_sui_payload(raw_tx: &str) -> Result<SuiSignedTx, Error> {
    let payload: SuiPayload = serde_json::from_str(raw_tx.trim()).map_err(|e| {
        let message = format!("Sui payload is not valid JSON: {}", e);
        Error::broadcast_failed(Chain::Sui.name(), message, None).with_cause(e)
    })?;

    let invalid = |message: String| Error::broadcast_failed(Chain::Sui.name(), message, None);
    Ok(SuiSignedTx {
        unsigned_tx: required(payload.unsigned_tx, "unsignedTx").map_err(invalid)?,
        signature: required(payload.signature, "signature").map_err(invalid)?,
    })
}

impl SuiBroadcaster {
    pub fn new(http: Client, rpc_url: impl Into<String>) -> Self {
        let rpc = JsonRpcClient::new(http, rpc_url);
        info!("Initializing Sui broadcaster with RPC: {}", rpc.url());
        Self { rpc }
    }
}

#[async_trait]
impl Broadcaster for SuiBroadcaster {
    fn family(&self) -> ChainFamily {
        ChainFamily::Sui
    }

    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String> {
        if chain != Chain::Sui {
            return Err(Error::unsupported_chain(chain.name(), "not a Sui chain").into());
        }
        let signed = parse_sui_payload(raw_tx)?;

        debug!("Executing transaction block via {}", self.rpc.url());

        let params = serde_json::json!([
            signed.unsigned_tx,
            [signed.signature],
            { "showEffects": true },
            "WaitForLocalExecution"
        ]);

        match self
            .rpc
            .call::<ExecuteResult>("sui_executeTransactionBlock", params)
            .await
        {
            Ok(result) => {
                info!("Transaction executed successfully on Sui: {}", result.digest);
                Ok(result.digest)
            }
            Err(JsonRpcError::Rejected { code, message }) => {
                warn!("Sui node rejected transaction ({}): {}", code, message);
                Err(classifier::rejection(chain, message).into())
            }
            Err(e) => Err(e).context("sui_executeTransactionBlock on Sui"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_payload() {
        let signed = parse_sui_payload(r#"{"unsignedTx":"AAAC","signature":"AKD4"}"#).unwrap();
        assert_eq!(signed.unsigned_tx, "AAAC");
        assert_eq!(signed.signature, "AKD4");
    }

    #[test]
    fn test_missing_fields_fail_as_broadcast_failed() {
        for payload in [
            r#"{"signature":"AKD4"}"#,
            r#"{"unsignedTx":"AAAC"}"#,
            r#"{"unsignedTx":"","signature":"AKD4"}"#,
            "not json",
        ] {
            let err = parse_sui_payload(payload).unwrap_err();
            assert_eq!(err.kind(), shared::ErrorKind::BroadcastFailed, "{}", payload);
            assert!(!err.possibly_already_submitted());
        }
    }

    #[test]
    fn test_missing_field_is_named() {
        let err = parse_sui_payload(r#"{"unsignedTx":"AAAC"}"#).unwrap_err();
        assert!(err.message().contains("signature"));
    }
}
