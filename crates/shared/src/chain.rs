use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Group of chains that share a submission protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainFamily {
    Evm,
    Utxo,
    Solana,
    Cosmos,
    Ton,
    Polkadot,
    Ripple,
    Sui,
    Tron,
}

impl ChainFamily {
    pub const ALL: [ChainFamily; 9] = [
        ChainFamily::Evm,
        ChainFamily::Utxo,
        ChainFamily::Solana,
        ChainFamily::Cosmos,
        ChainFamily::Ton,
        ChainFamily::Polkadot,
        ChainFamily::Ripple,
        ChainFamily::Sui,
        ChainFamily::Tron,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "EVM",
            ChainFamily::Utxo => "UTXO",
            ChainFamily::Solana => "Solana",
            ChainFamily::Cosmos => "Cosmos",
            ChainFamily::Ton => "TON",
            ChainFamily::Polkadot => "Polkadot",
            ChainFamily::Ripple => "Ripple",
            ChainFamily::Sui => "Sui",
            ChainFamily::Tron => "Tron",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Chain identifier accepted by the broadcast entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum Chain {
    // EVM
    Ethereum,
    Arbitrum,
    Avalanche,
    Base,
    Blast,
    Bsc,
    CronosChain,
    Mantle,
    Optimism,
    Polygon,
    Zksync,
    // UTXO
    Bitcoin,
    BitcoinCash,
    Litecoin,
    Dogecoin,
    Dash,
    Zcash,
    Cardano,
    // Cosmos SDK
    Cosmos,
    Osmosis,
    Dydx,
    Kujira,
    Terra,
    TerraClassic,
    Noble,
    Akash,
    ThorChain,
    MayaChain,
    // Single-chain families
    Solana,
    Ton,
    Polkadot,
    Ripple,
    Sui,
    Tron,
}

impl Chain {
    pub const ALL: [Chain; 34] = [
        Chain::Ethereum,
        Chain::Arbitrum,
        Chain::Avalanche,
        Chain::Base,
        Chain::Blast,
        Chain::Bsc,
        Chain::CronosChain,
        Chain::Mantle,
        Chain::Optimism,
        Chain::Polygon,
        Chain::Zksync,
        Chain::Bitcoin,
        Chain::BitcoinCash,
        Chain::Litecoin,
        Chain::Dogecoin,
        Chain::Dash,
        Chain::Zcash,
        Chain::Cardano,
        Chain::Cosmos,
        Chain::Osmosis,
        Chain::Dydx,
        Chain::Kujira,
        Chain::Terra,
        Chain::TerraClassic,
        Chain::Noble,
        Chain::Akash,
        Chain::ThorChain,
        Chain::MayaChain,
        Chain::Solana,
        Chain::Ton,
        Chain::Polkadot,
        Chain::Ripple,
        Chain::Sui,
        Chain::Tron,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Arbitrum => "Arbitrum",
            Chain::Avalanche => "Avalanche",
            Chain::Base => "Base",
            Chain::Blast => "Blast",
            Chain::Bsc => "BSC",
            Chain::CronosChain => "CronosChain",
            Chain::Mantle => "Mantle",
            Chain::Optimism => "Optimism",
            Chain::Polygon => "Polygon",
            Chain::Zksync => "Zksync",
            Chain::Bitcoin => "Bitcoin",
            Chain::BitcoinCash => "Bitcoin-Cash",
            Chain::Litecoin => "Litecoin",
            Chain::Dogecoin => "Dogecoin",
            Chain::Dash => "Dash",
            Chain::Zcash => "Zcash",
            Chain::Cardano => "Cardano",
            Chain::Cosmos => "Cosmos",
            Chain::Osmosis => "Osmosis",
            Chain::Dydx => "Dydx",
            Chain::Kujira => "Kujira",
            Chain::Terra => "Terra",
            Chain::TerraClassic => "TerraClassic",
            Chain::Noble => "Noble",
            Chain::Akash => "Akash",
            Chain::ThorChain => "THORChain",
            Chain::MayaChain => "MayaChain",
            Chain::Solana => "Solana",
            Chain::Ton => "Ton",
            Chain::Polkadot => "Polkadot",
            Chain::Ripple => "Ripple",
            Chain::Sui => "Sui",
            Chain::Tron => "Tron",
        }
    }

    /// Upper-case key used for per-chain environment overrides
    pub fn env_key(&self) -> String {
        self.name().to_uppercase().replace('-', "_")
    }

    pub fn is_evm(&self) -> bool {
        self.evm_chain_id().is_some()
    }

    pub fn is_utxo(&self) -> bool {
        matches!(
            self,
            Chain::Bitcoin
                | Chain::BitcoinCash
                | Chain::Litecoin
                | Chain::Dogecoin
                | Chain::Dash
                | Chain::Zcash
                | Chain::Cardano
        )
    }

    /// True for every Cosmos SDK chain, vault-style chains included
    pub fn is_cosmos(&self) -> bool {
        matches!(
            self,
            Chain::Cosmos
                | Chain::Osmosis
                | Chain::Dydx
                | Chain::Kujira
                | Chain::Terra
                | Chain::TerraClassic
                | Chain::Noble
                | Chain::Akash
                | Chain::ThorChain
                | Chain::MayaChain
        )
    }

    /// EIP-155 chain id for EVM chains
    pub fn evm_chain_id(&self) -> Option<u64> {
        match self {
            Chain::Ethereum => Some(1),
            Chain::Arbitrum => Some(42161),
            Chain::Avalanche => Some(43114),
            Chain::Base => Some(8453),
            Chain::Blast => Some(81457),
            Chain::Bsc => Some(56),
            Chain::CronosChain => Some(25),
            Chain::Mantle => Some(5000),
            Chain::Optimism => Some(10),
            Chain::Polygon => Some(137),
            Chain::Zksync => Some(324),
            _ => None,
        }
    }

    /// Multi-chain families resolve through the capability predicates, so a
    /// new member of an existing family only needs adding to its predicate.
    pub fn family(&self) -> ChainFamily {
        match self {
            Chain::Solana => ChainFamily::Solana,
            Chain::Ton => ChainFamily::Ton,
            Chain::Polkadot => ChainFamily::Polkadot,
            Chain::Ripple => ChainFamily::Ripple,
            Chain::Sui => ChainFamily::Sui,
            Chain::Tron => ChainFamily::Tron,
            chain if chain.is_evm() => ChainFamily::Evm,
            chain if chain.is_utxo() => ChainFamily::Utxo,
            chain if chain.is_cosmos() => ChainFamily::Cosmos,
            // Every remaining variant must be claimed by a predicate above;
            // listing them keeps a new chain from compiling without a family.
            Chain::Ethereum
            | Chain::Arbitrum
            | Chain::Avalanche
            | Chain::Base
            | Chain::Blast
            | Chain::Bsc
            | Chain::CronosChain
            | Chain::Mantle
            | Chain::Optimism
            | Chain::Polygon
            | Chain::Zksync => ChainFamily::Evm,
            Chain::Bitcoin
            | Chain::BitcoinCash
            | Chain::Litecoin
            | Chain::Dogecoin
            | Chain::Dash
            | Chain::Zcash
            | Chain::Cardano => ChainFamily::Utxo,
            Chain::Cosmos
            | Chain::Osmosis
            | Chain::Dydx
            | Chain::Kujira
            | Chain::Terra
            | Chain::TerraClassic
            | Chain::Noble
            | Chain::Akash
            | Chain::ThorChain
            | Chain::MayaChain => ChainFamily::Cosmos,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        let chain = match normalized.as_str() {
            "ethereum" | "eth" => Chain::Ethereum,
            "arbitrum" | "arb" => Chain::Arbitrum,
            "avalanche" | "avax" => Chain::Avalanche,
            "base" => Chain::Base,
            "blast" => Chain::Blast,
            "bsc" | "bscchain" | "bnb" | "binancesmartchain" => Chain::Bsc,
            "cronoschain" | "cronos" | "cro" => Chain::CronosChain,
            "mantle" | "mnt" => Chain::Mantle,
            "optimism" | "op" => Chain::Optimism,
            "polygon" | "matic" | "pol" => Chain::Polygon,
            "zksync" => Chain::Zksync,
            "bitcoin" | "btc" => Chain::Bitcoin,
            "bitcoincash" | "bch" => Chain::BitcoinCash,
            "litecoin" | "ltc" => Chain::Litecoin,
            "dogecoin" | "doge" => Chain::Dogecoin,
            "dash" => Chain::Dash,
            "zcash" | "zec" => Chain::Zcash,
            "cardano" | "ada" => Chain::Cardano,
            "cosmos" | "gaia" | "gaiachain" | "atom" => Chain::Cosmos,
            "osmosis" | "osmo" => Chain::Osmosis,
            "dydx" => Chain::Dydx,
            "kujira" | "kuji" => Chain::Kujira,
            "terra" | "luna" => Chain::Terra,
            "terraclassic" | "lunc" => Chain::TerraClassic,
            "noble" => Chain::Noble,
            "akash" | "akt" => Chain::Akash,
            "thorchain" | "thor" | "rune" => Chain::ThorChain,
            "mayachain" | "maya" | "cacao" => Chain::MayaChain,
            "solana" | "sol" => Chain::Solana,
            "ton" => Chain::Ton,
            "polkadot" | "dot" => Chain::Polkadot,
            "ripple" | "xrp" => Chain::Ripple,
            "sui" => Chain::Sui,
            "tron" | "trx" => Chain::Tron,
            _ => {
                return Err(Error::unsupported_chain(
                    s.trim(),
                    "unknown chain identifier",
                ))
            }
        };
        Ok(chain)
    }
}

impl TryFrom<String> for Chain {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
