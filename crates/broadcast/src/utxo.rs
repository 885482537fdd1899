use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{Chain, ChainFamily, Error};
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;
use crate::decode;

/// Push-transaction API shared by the Bitcoin-family chains
pub struct UtxoBroadcaster {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    data: Option<PushData>,
    context: Option<PushContext>,
}

#[derive(Debug, Deserialize)]
struct PushData {
    transaction_hash: String,
}

#[derive(Debug, Deserialize)]
struct PushContext {
    error: Option<String>,
}

/// Path segment the push API uses for a chain
pub fn push_slug(chain: Chain) -> Option<&'static str> {
    match chain {
        Chain::Bitcoin => Some("bitcoin"),
        Chain::BitcoinCash => Some("bitcoin-cash"),
        Chain::Litecoin => Some("litecoin"),
        Chain::Dogecoin => Some("dogecoin"),
        Chain::Dash => Some("dash"),
        Chain::Zcash => Some("zcash"),
        Chain::Cardano => Some("cardano"),
        _ => None,
    }
}

impl UtxoBroadcaster {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Initializing UTXO broadcaster with push API: {}", base_url);
        Self { http, base_url }
    }

    fn push_url(&self, chain: Chain) -> Result<String, Error> {
        let slug = push_slug(chain)
            .ok_or_else(|| Error::unsupported_chain(chain.name(), "no push endpoint for chain"))?;
        Ok(format!("{}/{}/push/transaction", self.base_url, slug))
    }
}

/// Either the transaction hash or the error text to classify
fn parse_push_response(body: &str) -> Result<String, String> {
    match serde_json::from_str::<PushResponse>(body) {
        Ok(PushResponse {
            data: Some(data), ..
        }) => Ok(data.transaction_hash),
        Ok(PushResponse {
            context: Some(PushContext { error: Some(error) }),
            ..
        }) => Err(error),
        _ => Err(body.to_string()),
    }
}

#[async_trait]
impl Broadcaster for UtxoBroadcaster {
    fn family(&self) -> ChainFamily {
        ChainFamily::Utxo
    }

    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String> {
        let url = self.push_url(chain)?;
        let payload = decode::hex_payload(raw_tx)?;

        debug!("Pushing {} transaction to {}", chain, url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "data": payload }))
            .send()
            .await
            .with_context(|| format!("Failed to reach {} push endpoint", chain))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} push response", chain))?;

        // Failures come back as a JSON body with a non-2xx status, so the
        // body is inspected first.
        match parse_push_response(&body) {
            Ok(tx_hash) => {
                info!("Transaction submitted successfully to {}: {}", chain, tx_hash);
                Ok(tx_hash)
            }
            Err(message) if message.trim().is_empty() => Err(anyhow!(
                "{} push endpoint returned status {} with an empty body",
                chain,
                status
            )),
            Err(message) => {
                warn!("{} push rejected (status {}): {}", chain, status, message);
                Err(classifier::rejection(chain, message).into())
            }
        }
    }
}
