use anyhow::{anyhow, Context};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use shared::{Chain, ChainFamily, Error};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;
use crate::decode;

const BROADCAST_PATH: &str = "/cosmos/tx/v1beta1/txs";

/// Cosmos SDK `BroadcastTx` over the REST gateway, one endpoint per chain
pub struct CosmosBroadcaster {
    http: Client,
    api_urls: HashMap<Chain, String>,
}

#[derive(Debug, Deserialize)]
struct BroadcastTxResponse {
    tx_response: Option<TxResponse>,
    // gRPC-gateway error shape
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    txhash: String,
    #[serde(default)]
    code: u32,
    #[serde(default)]
    raw_log: String,
    #[serde(default)]
    codespace: String,
}

impl CosmosBroadcaster {
    pub fn new(http: Client, api_urls: HashMap<Chain, String>) -> Self {
        info!("Initializing Cosmos broadcaster for {} chains", api_urls.len());
        Self { http, api_urls }
    }

    pub fn chains(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = self.api_urls.keys().copied().collect();
        chains.sort();
        chains
    }

    fn broadcast_url(&self, chain: Chain) -> Result<String, Error> {
        let base = self.api_urls.get(&chain).ok_or_else(|| {
            let configured: Vec<&str> = self.chains().iter().map(|c| c.name()).collect();
            Error::unsupported_chain(
                chain.name(),
                format!(
                    "no Cosmos API endpoint configured; configured chains: {}",
                    configured.join(", ")
                ),
            )
        })?;
        Ok(format!("{}{}", base.trim_end_matches('/'), BROADCAST_PATH))
    }
}

/// Either the transaction hash or the rejection text
fn parse_broadcast_response(body: &str) -> anyhow::Result<Result<String, String>> {
    let response: BroadcastTxResponse = serde_json::from_str(body)
        .with_context(|| format!("Unexpected broadcast response: {}", body))?;

    match response.tx_response {
        Some(tx) if tx.code == 0 => {
            if tx.txhash.is_empty() {
                return Err(anyhow!("Broadcast accepted but no transaction hash returned"));
            }
            Ok(Ok(tx.txhash))
        }
        Some(tx) => Ok(Err(format!(
            "code {} ({}): {} [txhash {}]",
            tx.code, tx.codespace, tx.raw_log, tx.txhash
        ))),
        None => match (response.code, response.message) {
            (Some(code), Some(message)) => Ok(Err(format!("code {}: {}", code, message))),
            _ => Err(anyhow!("Unexpected broadcast response: {}", body)),
        },
    }
}

#[async_trait]
impl Broadcaster for CosmosBroadcaster {
    fn family(&self) -> ChainFamily {
        ChainFamily::Cosmos
    }

    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String> {
        let url = self.broadcast_url(chain)?;
        let decoded = decode::decode_cosmos_tx(raw_tx)?;

        debug!(
            "Broadcasting {} byte {} transaction (decoded as {:?}) to {}",
            decoded.bytes.len(),
            chain,
            decoded.decoded_as,
            url
        );

        let request_body = serde_json::json!({
            "tx_bytes": BASE64_STANDARD.encode(&decoded.bytes),
            "mode": "BROADCAST_MODE_SYNC"
        });

        let response = self
            .http
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .with_context(|| format!("Failed to reach {} API", chain))?;
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} broadcast response", chain))?;

        match parse_broadcast_response(&body)? {
            Ok(tx_hash) => {
                info!("Transaction submitted successfully to {}: {}", chain, tx_hash);
                Ok(tx_hash)
            }
            Err(message) => {
                warn!("{} rejected transaction: {}", chain, message);
                Err(classifier::rejection(chain, message).into())
            }
        }
    }
}
