use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{Chain, ChainFamily, Error};
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;

/// `wallet/broadcasttransaction` on a Tron full node HTTP API
pub struct TronBroadcaster {
    http: Client,
    api_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TronBroadcastResponse {
    pub txid: Option<String>,
    pub result: Option<bool>,
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Tron hex-encodes `message`; fall back to the raw text when it is not
fn decode_message(message: &str) -> String {
    hex::decode(message)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| message.to_string())
}

fn evaluate(chain: Chain, response: TronBroadcastResponse) -> Result<String, Error> {
    if let Some(code) = response.code.as_deref().filter(|code| *code != "SUCCESS") {
        let message = response
            .message
            .as_deref()
            .map(decode_message)
            .unwrap_or_default();
        return Err(classifier::rejection(chain, format!("{}: {}", code, message)));
    }

    match response.txid {
        Some(txid) if !txid.is_empty() => Ok(txid),
        _ => Err(Error::broadcast_failed(
            chain.name(),
            "Broadcast accepted but no transaction id returned",
            None,
        )),
    }
}

impl TronBroadcaster {
    pub fn new(http: Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        info!("Initializing Tron broadcaster with API: {}", api_url);
        Self { http, api_url }
    }
}

#[async_trait]
impl Broadcaster for TronBroadcaster {
    fn family(&self) -> ChainFamily {
        ChainFamily::Tron
    }

    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String> {
        if chain != Chain::Tron {
            return Err(Error::unsupported_chain(chain.name(), "not a Tron chain").into());
        }

        let transaction: serde_json::Value =
            serde_json::from_str(raw_tx.trim()).context("Tron transaction is not valid JSON")?;
        if !transaction.is_object() {
            return Err(Error::broadcast_failed(
                chain.name(),
                "Tron transaction must be a JSON object",
                None,
            )
            .into());
        }

        let url = format!("{}/wallet/broadcasttransaction", self.api_url);
        debug!("Broadcasting Tron transaction to {}", url);

        let response: TronBroadcastResponse = self
            .http
            .post(&url)
            .json(&transaction)
            .send()
            .await
            .context("Failed to reach Tron API")?
            .json()
            .await
            .context("Failed to parse Tron broadcast response")?;

        match evaluate(chain, response) {
            Ok(txid) => {
                info!("Transaction submitted successfully to Tron: {}", txid);
                Ok(txid)
            }
            Err(e) => {
                warn!("Tron broadcast failed: {}", e);
                Err(e.into())
            }
        }
    }
}
