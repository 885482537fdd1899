use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{Chain, ChainFamily, Error};
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;
use crate::decode;

/// rippled `submit` command in blob mode
pub struct RippleBroadcaster {
    http: Client,
    rpc_url: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    result: SubmitResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubmitResult {
    status: Option<String>,
    engine_result: Option<String>,
    engine_result_message: Option<String>,
    tx_json: Option<TxJson>,
    error: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TxJson {
    hash: Option<String>,
}

#[derive(Debug, PartialEq)]
enum SubmitOutcome {
    Accepted(String),
    Rejected(String),
}

/// Preliminary results that mean the transaction entered the open ledger or
/// the queue
fn is_accepted(engine_result: &str) -> bool {
    engine_result.starts_with("tes") || engine_result == "terQUEUED"
}

fn parse_submit_response(body: &str) -> anyhow::Result<SubmitOutcome> {
    let response: SubmitResponse = serde_json::from_str(body)
        .with_context(|| format!("Unexpected submit response: {}", body))?;
    let result = response.result;

    if result.status.as_deref() == Some("error") {
        let message = result
            .error_message
            .or(result.error)
            .unwrap_or_else(|| "Unknown error".to_string());
        return Ok(SubmitOutcome::Rejected(message));
    }

    let engine_result = result
        .engine_result
        .ok_or_else(|| anyhow!("Submit response has no engine_result: {}", body))?;

    if !is_accepted(&engine_result) {
        let detail = result.engine_result_message.unwrap_or_default();
        return Ok(SubmitOutcome::Rejected(format!("{}: {}", engine_result, detail)));
    }

    result
        .tx_json
        .and_then(|tx| tx.hash)
        .map(SubmitOutcome::Accepted)
        .ok_or_else(|| anyhow!("Submit accepted ({}) but no hash returned", engine_result))
}

impl RippleBroadcaster {
    pub fn new(http: Client, rpc_url: impl Into<String>) -> Self {
        let rpc_url = rpc_url.into();
        info!("Initializing Ripple broadcaster with RPC: {}", rpc_url);
        Self { http, rpc_url }
    }
}

#[async_trait]
impl Broadcaster for RippleBroadcaster {
    fn family(&self) -> ChainFamily {
        ChainFamily::Ripple
    }

    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String> {
        if chain != Chain::Ripple {
            return Err(Error::unsupported_chain(chain.name(), "not a Ripple chain").into());
        }
        let tx_blob = decode::hex_payload(raw_tx)?;

        debug!("Submitting tx_blob to {}", self.rpc_url);

        let request_body = serde_json::json!({
            "method": "submit",
            "params": [{ "tx_blob": tx_blob }]
        });
        let response = self
            .http
            .post(&self.rpc_url)
            .json(&request_body)
            .send()
            .await
            .context("Failed to reach rippled")?;
        let body = response.text().await.context("Failed to read rippled response")?;

        match parse_submit_response(&body)? {
            SubmitOutcome::Accepted(tx_hash) => {
                info!("Transaction submitted successfully to Ripple: {}", tx_hash);
                Ok(tx_hash)
            }
            SubmitOutcome::Rejected(message) => {
                warn!("rippled rejected transaction: {}", message);
                Err(classifier::rejection(chain, message).into())
            }
        }
    }
}
