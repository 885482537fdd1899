use shared::{BroadcastConfig, Chain, ChainFamily, Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::broadcaster::Broadcaster;
use crate::classifier;
use crate::cosmos::CosmosBroadcaster;
use crate::evm::EvmBroadcaster;
use crate::polkadot::PolkadotBroadcaster;
use crate::ripple::RippleBroadcaster;
use crate::solana::SolanaBroadcaster;
use crate::sui::SuiBroadcaster;
use crate::ton::TonBroadcaster;
use crate::tron::TronBroadcaster;
use crate::utxo::UtxoBroadcaster;

/// Request timeout for clients the dispatcher does not build itself
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Routes a signed transaction to the broadcaster of its chain family.
///
/// Holds no per-call state; share it behind an `Arc` to broadcast
/// concurrently.
pub struct BroadcastDispatcher {
    http: reqwest::Client,
    request_timeout: Duration,
    broadcasters: HashMap<ChainFamily, Arc<dyn Broadcaster>>,
}

impl BroadcastDispatcher {
    /// Empty dispatcher with a default HTTP client
    pub fn new() -> Self {
        Self::with_http_client(reqwest::Client::new())
    }

    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self {
            http,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            broadcasters: HashMap::new(),
        }
    }

    /// Timeout for broadcasters that own their RPC client (Solana).
    /// Registered broadcasters keep the timeout they were built with.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Dispatcher with every family registered from `config`
    pub fn from_config(config: &BroadcastConfig) -> anyhow::Result<Self> {
        info!("Initializing broadcast dispatcher from config");

        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self::with_http_client(http)
            .with_request_timeout(timeout)
            .with_evm(config.evm_rpc_urls.clone())
            .with_utxo(config.utxo_push_base_url.clone())
            .with_solana(config.solana_rpc_url.clone())
            .with_cosmos(config.cosmos_api_urls.clone())
            .with_ton(config.ton_api_url.clone())
            .with_polkadot(config.polkadot_rpc_url.clone())
            .with_ripple(config.ripple_rpc_url.clone())
            .with_sui(config.sui_rpc_url.clone())
            .with_tron(config.tron_api_url.clone()))
    }

    /// Register a broadcaster, replacing any existing one for its family
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        info!("Registering {} broadcaster", broadcaster.family());
        self.broadcasters.insert(broadcaster.family(), broadcaster);
        self
    }

    pub fn with_evm(self, rpc_urls: HashMap<Chain, String>) -> Self {
        let http = self.http.clone();
        self.with_broadcaster(Arc::new(EvmBroadcaster::new(http, rpc_urls)))
    }

    pub fn with_utxo(self, push_base_url: String) -> Self {
        let http = self.http.clone();
        self.with_broadcaster(Arc::new(UtxoBroadcaster::new(http, push_base_url)))
    }

    pub fn with_solana(self, rpc_url: String) -> Self {
        let timeout = self.request_timeout;
        self.with_broadcaster(Arc::new(SolanaBroadcaster::new(rpc_url, timeout)))
    }

    pub fn with_cosmos(self, api_urls: HashMap<Chain, String>) -> Self {
        let http = self.http.clone();
        self.with_broadcaster(Arc::new(CosmosBroadcaster::new(http, api_urls)))
    }

    pub fn with_ton(self, api_url: String) -> Self {
        let http = self.http.clone();
        self.with_broadcaster(Arc::new(TonBroadcaster::new(http, api_url)))
    }

    pub fn with_polkadot(self, rpc_url: String) -> Self {
        let http = self.http.clone();
        self.with_broadcaster(Arc::new(PolkadotBroadcaster::new(http, rpc_url)))
    }

    pub fn with_ripple(self, rpc_url: String) -> Self {
        let http = self.http.clone();
        self.with_broadcaster(Arc::new(RippleBroadcaster::new(http, rpc_url)))
    }

    pub fn with_sui(self, rpc_url: String) -> Self {
        let http = self.http.clone();
        self.with_broadcaster(Arc::new(SuiBroadcaster::new(http, rpc_url)))
    }

    pub fn with_tron(self, api_url: String) -> Self {
        let http = self.http.clone();
        self.with_broadcaster(Arc::new(TronBroadcaster::new(http, api_url)))
    }

    /// Registered families in stable order
    pub fn supported_families(&self) -> Vec<ChainFamily> {
        let mut families: Vec<ChainFamily> = self.broadcasters.keys().copied().collect();
        families.sort();
        families
    }

    fn supported_list(&self) -> String {
        let names: Vec<&str> = self
            .supported_families()
            .iter()
            .map(|family| family.name())
            .collect();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }

    /// Submit `raw_tx` to the chain named by `chain` and return its
    /// transaction id.
    pub async fn broadcast_raw_tx(&self, chain: &str, raw_tx: &str) -> Result<String> {
        let chain = chain.parse::<Chain>().map_err(|e| {
            warn!("Rejecting broadcast for unknown chain: {}", e);
            Error::unsupported_chain(
                chain.trim(),
                format!("unknown chain identifier; supported families: {}", self.supported_list()),
            )
        })?;
        self.broadcast(chain, raw_tx).await
    }

    pub async fn broadcast(&self, chain: Chain, raw_tx: &str) -> Result<String> {
        let family = chain.family();
        let broadcaster = self.broadcasters.get(&family).ok_or_else(|| {
            warn!("No broadcaster registered for {} ({})", chain, family);
            Error::unsupported_chain(
                chain.name(),
                format!(
                    "no {} broadcaster registered; supported families: {}",
                    family,
                    self.supported_list()
                ),
            )
        })?;

        match broadcaster.broadcast(chain, raw_tx).await {
            Ok(tx_id) => Ok(tx_id),
            Err(err) => {
                let err = match err.downcast::<Error>() {
                    Ok(Error::UnsupportedChain { chain, reason }) => Error::unsupported_chain(
                        chain,
                        format!("{}; supported families: {}", reason, self.supported_list()),
                    ),
                    Ok(classified) => classified,
                    Err(other) => classifier::wrap_failure(chain, other),
                };
                warn!(
                    chain = chain.name(),
                    possibly_already_submitted = err.possibly_already_submitted(),
                    "Broadcast failed: {}",
                    err
                );
                Err(err)
            }
        }
    }
}

impl Default for BroadcastDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
