use serde::Deserialize;
use std::collections::HashMap;
use std::env;

use crate::chain::Chain;

/// Endpoints and transport settings for every chain family
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub evm_rpc_urls: HashMap<Chain, String>,
    pub utxo_push_base_url: String,
    pub solana_rpc_url: String,
    pub cosmos_api_urls: HashMap<Chain, String>,
    pub ton_api_url: String,
    pub polkadot_rpc_url: String,
    pub ripple_rpc_url: String,
    pub sui_rpc_url: String,
    pub tron_api_url: String,
    /// Per-request timeout applied by the shared HTTP client
    pub request_timeout_secs: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            evm_rpc_urls: default_evm_rpc_urls(),
            utxo_push_base_url: "https://api.blockchair.com".to_string(),
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            cosmos_api_urls: default_cosmos_api_urls(),
            ton_api_url: "https://toncenter.com/api/v2".to_string(),
            polkadot_rpc_url: "https://rpc.polkadot.io".to_string(),
            ripple_rpc_url: "https://xrplcluster.com".to_string(),
            sui_rpc_url: "https://fullnode.mainnet.sui.io:443".to_string(),
            tron_api_url: "https://api.trongrid.io".to_string(),
            request_timeout_secs: 30,
        }
    }
}

fn default_evm_rpc_urls() -> HashMap<Chain, String> {
    [
        (Chain::Ethereum, "https://ethereum-rpc.publicnode.com"),
        (Chain::Arbitrum, "https://arbitrum-one-rpc.publicnode.com"),
        (Chain::Avalanche, "https://avalanche-c-chain-rpc.publicnode.com"),
        (Chain::Base, "https://base-rpc.publicnode.com"),
        (Chain::Blast, "https://blast-rpc.publicnode.com"),
        (Chain::Bsc, "https://bsc-rpc.publicnode.com"),
        (Chain::CronosChain, "https://cronos-evm-rpc.publicnode.com"),
        (Chain::Mantle, "https://mantle-rpc.publicnode.com"),
        (Chain::Optimism, "https://optimism-rpc.publicnode.com"),
        (Chain::Polygon, "https://polygon-bor-rpc.publicnode.com"),
        (Chain::Zksync, "https://mainnet.era.zksync.io"),
    ]
    .into_iter()
    .map(|(chain, url)| (chain, url.to_string()))
    .collect()
}

fn default_cosmos_api_urls() -> HashMap<Chain, String> {
    [
        (Chain::Cosmos, "https://cosmos-rest.publicnode.com"),
        (Chain::Osmosis, "https://osmosis-rest.publicnode.com"),
        (Chain::Dydx, "https://dydx-rest.publicnode.com"),
        (Chain::Kujira, "https://kujira-rest.publicnode.com"),
        (Chain::Terra, "https://terra-rest.publicnode.com"),
        (Chain::TerraClassic, "https://terra-classic-lcd.publicnode.com"),
        (Chain::Noble, "https://noble-api.polkachu.com"),
        (Chain::Akash, "https://akash-rest.publicnode.com"),
        (Chain::ThorChain, "https://thornode.ninerealms.com"),
        (Chain::MayaChain, "https://mayanode.mayachain.info"),
    ]
    .into_iter()
    .map(|(chain, url)| (chain, url.to_string()))
    .collect()
}

impl BroadcastConfig {
    /// Defaults overridden by environment variables (and `.env` if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        for chain in Chain::ALL {
            if chain.is_evm() {
                if let Ok(url) = env::var(format!("EVM_RPC_URL_{}", chain.env_key())) {
                    config.evm_rpc_urls.insert(chain, url);
                }
            } else if chain.is_cosmos() {
                if let Ok(url) = env::var(format!("COSMOS_API_URL_{}", chain.env_key())) {
                    config.cosmos_api_urls.insert(chain, url);
                }
            }
        }

        override_from_env(&mut config.utxo_push_base_url, "UTXO_PUSH_BASE_URL");
        override_from_env(&mut config.solana_rpc_url, "SOLANA_RPC_URL");
        override_from_env(&mut config.ton_api_url, "TON_API_URL");
        override_from_env(&mut config.polkadot_rpc_url, "POLKADOT_RPC_URL");
        override_from_env(&mut config.ripple_rpc_url, "RIPPLE_RPC_URL");
        override_from_env(&mut config.sui_rpc_url, "SUI_RPC_URL");
        override_from_env(&mut config.tron_api_url, "TRON_API_URL");

        if let Ok(timeout) = env::var("BROADCAST_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout.parse()?;
        }

        Ok(config)
    }
}

fn override_from_env(field: &mut String, key: &str) {
    if let Ok(value) = env::var(key) {
        *field = value;
    }
}
