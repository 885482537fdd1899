//! Sniff-and-decode steps for payloads whose encoding is not declared.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::Deserialize;

/// How a Solana payload was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolanaEncoding {
    Base58,
    Base64,
}

/// How a Cosmos payload was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CosmosEncoding {
    /// `{"tx_bytes": "<base64>"}`
    Json,
    /// The whole payload is base64 protobuf bytes
    RawBytes,
}

/// Decoded transaction bytes tagged with the encoding that was detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<E> {
    pub bytes: Vec<u8>,
    pub decoded_as: E,
}

/// Base64 is recognised by padding or by characters outside the base58
/// alphabet; anything else is treated as base58.
pub fn sniff_solana_encoding(raw: &str) -> SolanaEncoding {
    if raw.contains(['=', '+', '/']) {
        SolanaEncoding::Base64
    } else {
        SolanaEncoding::Base58
    }
}

pub fn decode_solana_tx(raw: &str) -> Result<Decoded<SolanaEncoding>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("Empty Solana transaction payload"));
    }

    let decoded_as = sniff_solana_encoding(raw);
    let bytes = match decoded_as {
        SolanaEncoding::Base64 => BASE64_STANDARD
            .decode(raw)
            .context("Solana transaction is not valid base64")?,
        SolanaEncoding::Base58 => bs58::decode(raw)
            .into_vec()
            .context("Solana transaction is not valid base58")?,
    };

    Ok(Decoded { bytes, decoded_as })
}

#[derive(Debug, Deserialize)]
struct CosmosTxEnvelope {
    tx_bytes: String,
}

pub fn decode_cosmos_tx(raw: &str) -> Result<Decoded<CosmosEncoding>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("Empty Cosmos transaction payload"));
    }

    match serde_json::from_str::<CosmosTxEnvelope>(raw) {
        Ok(envelope) => {
            let bytes = BASE64_STANDARD
                .decode(envelope.tx_bytes.trim())
                .context("tx_bytes is not valid base64")?;
            Ok(Decoded {
                bytes,
                decoded_as: CosmosEncoding::Json,
            })
        }
        Err(_) => {
            let bytes = BASE64_STANDARD
                .decode(raw)
                .context("Cosmos transaction is neither a tx_bytes envelope nor base64")?;
            Ok(Decoded {
                bytes,
                decoded_as: CosmosEncoding::RawBytes,
            })
        }
    }
}

/// Strip an optional `0x`/`0X` prefix and check the rest is non-empty hex
pub fn hex_payload(raw: &str) -> Result<&str> {
    let raw = raw.trim();
    let stripped = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    if stripped.is_empty() {
        return Err(anyhow!("Empty hex transaction payload"));
    }
    hex::decode(stripped).context("Transaction payload is not valid hex")?;

    Ok(stripped)
}

/// Same as [`hex_payload`] but always `0x`-prefixed
pub fn prefixed_hex_payload(raw: &str) -> Result<String> {
    hex_payload(raw).map(|hex| format!("0x{}", hex))
}
