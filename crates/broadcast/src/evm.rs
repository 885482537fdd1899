use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use shared::{Chain, ChainFamily, Error};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;
use crate::decode;
use crate::jsonrpc::{JsonRpcClient, JsonRpcError};

/// `eth_sendRawTransaction` against the configured node of each EVM chain
pub struct EvmBroadcaster {
    http: Client,
    rpc_urls: HashMap<Chain, String>,
}

impl EvmBroadcaster {
    pub fn new(http: Client, rpc_urls: HashMap<Chain, String>) -> Self {
        info!("Initializing EVM broadcaster for {} chains", rpc_urls.len());
        Self { http, rpc_urls }
    }

    /// Chains with a configured RPC endpoint
    pub fn chains(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = self.rpc_urls.keys().copied().collect();
        chains.sort();
        chains
    }

    fn rpc_url(&self, chain: Chain) -> Result<&str, Error> {
        self.rpc_urls.get(&chain).map(String::as_str).ok_or_else(|| {
            let configured: Vec<&str> = self.chains().iter().map(|c| c.name()).collect();
            Error::unsupported_chain(
                chain.name(),
                format!(
                    "no EVM RPC endpoint configured; configured chains: {}",
                    configured.join(", ")
                ),
            )
        })
    }
}

/// A node rejection. When it looks like a re-submission the caller is told
/// the hash has to come from the signed payload.
fn node_rejection(chain: Chain, message: String) -> Error {
    match classifier::classify(ChainFamily::Evm, &message) {
        Some(signal) => Error::broadcast_failed(
            chain.name(),
            format!(
                "{} (transaction may already be submitted; its hash cannot be recovered \
                 from this error and must be computed from the signed payload)",
                message
            ),
            Some(signal),
        ),
        None => Error::broadcast_failed(chain.name(), message, None),
    }
}

#[async_trait]
impl Broadcaster for EvmBroadcaster {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String> {
        let rpc_url = self.rpc_url(chain)?;
        let payload = decode::prefixed_hex_payload(raw_tx)?;

        debug!("Submitting transaction to {} via {}", chain, rpc_url);

        let rpc = JsonRpcClient::new(self.http.clone(), rpc_url);
        match rpc
            .call::<String>("eth_sendRawTransaction", serde_json::json!([payload]))
            .await
        {
            Ok(tx_hash) => {
                info!("Transaction submitted successfully to {}: {}", chain, tx_hash);
                Ok(tx_hash)
            }
            Err(JsonRpcError::Rejected { code, message }) => {
                warn!("{} node rejected transaction ({}): {}", chain, code, message);
                Err(node_rejection(chain, message).into())
            }
            Err(e) => Err(e).with_context(|| format!("eth_sendRawTransaction on {}", chain)),
        }
    }
}
