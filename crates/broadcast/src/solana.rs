use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use shared::{Chain, ChainFamily, Error};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_transaction_status::UiTransactionEncoding;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;
use crate::decode;

/// Retries are left to the RPC node's own resend loop
const MAX_NODE_RETRIES: usize = 3;

/// `sendTransaction` through the Solana RPC client
pub struct SolanaBroadcaster {
    client: RpcClient,
}

impl SolanaBroadcaster {
    /// `timeout` bounds each RPC request, like the shared HTTP client does
    /// for the other families.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Self {
        let rpc_url = rpc_url.into();
        info!(
            "Initializing Solana broadcaster with RPC: {} (timeout {:?})",
            rpc_url, timeout
        );
        Self {
            client: RpcClient::new_with_timeout_and_commitment(
                rpc_url,
                timeout,
                CommitmentConfig::confirmed(),
            ),
        }
    }

    pub fn rpc_url(&self) -> String {
        self.client.url()
    }
}

pub fn send_config() -> RpcSendTransactionConfig {
    RpcSendTransactionConfig {
        skip_preflight: false,
        preflight_commitment: Some(CommitmentLevel::Confirmed),
        encoding: Some(UiTransactionEncoding::Base64),
        max_retries: Some(MAX_NODE_RETRIES),
        min_context_slot: None,
    }
}

#[async_trait]
impl Broadcaster for SolanaBroadcaster {
    fn family(&self) -> ChainFamily {
        ChainFamily::Solana
    }

    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String> {
        if chain != Chain::Solana {
            return Err(Error::unsupported_chain(chain.name(), "not a Solana chain").into());
        }

        let decoded = decode::decode_solana_tx(raw_tx)?;
        debug!(
            "Submitting {} byte Solana transaction (decoded as {:?})",
            decoded.bytes.len(),
            decoded.decoded_as
        );

        // The payload is already signed, so it goes out as-is rather than
        // through a typed Transaction.
        let params = serde_json::json!([
            BASE64_STANDARD.encode(&decoded.bytes),
            serde_json::to_value(send_config())?
        ]);

        match self
            .client
            .send::<String>(RpcRequest::SendTransaction, params)
            .await
        {
            Ok(signature) => {
                info!("Transaction submitted successfully to Solana: {}", signature);
                Ok(signature)
            }
            Err(e) => {
                warn!("Solana RPC rejected transaction: {}", e);
                Err(classifier::rejection(chain, e.to_string()).with_cause(e).into())
            }
        }
    }
}
