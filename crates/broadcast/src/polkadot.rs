use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use shared::{Chain, ChainFamily, Error};
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;
use crate::decode;
use crate::jsonrpc::{JsonRpcClient, JsonRpcError};

/// `author_submitExtrinsic` against a Substrate JSON-RPC node
pub struct PolkadotBroadcaster {
    rpc: JsonRpcClient,
}

impl PolkadotBroadcaster {
    pub fn new(http: Client, rpc_url: impl Into<String>) -> Self {
        let rpc = JsonRpcClient::new(http, rpc_url);
        info!("Initializing Polkadot broadcaster with RPC: {}", rpc.url());
        Self { rpc }
    }
}

#[async_trait]
impl Broadcaster for PolkadotBroadcaster {
    fn family(&self) -> ChainFamily {
        ChainFamily::Polkadot
    }

    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String> {
        if chain != Chain::Polkadot {
            return Err(Error::unsupported_chain(chain.name(), "not a Polkadot chain").into());
        }
        let extrinsic = decode::prefixed_hex_payload(raw_tx)?;

        debug!("Submitting {} char extrinsic to {}", extrinsic.len(), self.rpc.url());

        match self
            .rpc
            .call::<String>("author_submitExtrinsic", serde_json::json!([extrinsic]))
            .await
        {
            Ok(tx_hash) => {
                info!("Extrinsic submitted successfully to Polkadot: {}", tx_hash);
                Ok(tx_hash)
            }
            Err(JsonRpcError::Rejected { code, message }) => {
                warn!("Polkadot node rejected extrinsic ({}): {}", code, message);
                Err(classifier::rejection(chain, message).into())
            }
            Err(e) => Err(e).context("author_submitExtrinsic on Polkadot"),
        }
    }
}
