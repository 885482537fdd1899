use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{Chain, ChainFamily, Error};
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;

/// BOC submission through a toncenter-style HTTP API
pub struct TonBroadcaster {
    http: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct SendBocResponse {
    #[serde(default)]
    ok: bool,
    result: Option<SendBocResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendBocResult {
    hash: String,
}

impl TonBroadcaster {
    pub fn new(http: Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        info!("Initializing TON broadcaster with API: {}", api_url);
        Self { http, api_url }
    }
}

#[async_trait]
impl Broadcaster for TonBroadcaster {
    fn family(&self) -> ChainFamily {
        ChainFamily::Ton
    }

    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String> {
        if chain != Chain::Ton {
            return Err(Error::unsupported_chain(chain.name(), "not a TON chain").into());
        }
        let boc = raw_tx.trim();
        if boc.is_empty() {
            return Err(anyhow!("Empty BOC payload"));
        }

        let url = format!("{}/sendBocReturnHash", self.api_url);
        debug!("Submitting BOC to {}", url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "boc": boc }))
            .send()
            .await
            .context("Failed to reach TON API")?;
        let status = response.status();
        let body = response.text().await.context("Failed to read TON response")?;

        let parsed: SendBocResponse = serde_json::from_str(&body)
            .with_context(|| format!("Unexpected TON response (status {}): {}", status, body))?;

        match parsed {
            SendBocResponse {
                ok: true,
                result: Some(result),
                ..
            } => {
                info!("Transaction submitted successfully to TON: {}", result.hash);
                Ok(result.hash)
            }
            SendBocResponse {
                error: Some(error), ..
            } => {
                warn!("TON rejected BOC (status {}): {}", status, error);
                Err(classifier::rejection(chain, error).into())
            }
            _ => Err(anyhow!(
                "TON API returned status {} without a hash: {}",
                status,
                body
            )),
        }
    }
}
