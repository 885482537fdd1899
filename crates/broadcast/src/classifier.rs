//! Duplicate-submission classification.
//!
//! Every chain family reports "this transaction is already known" in its own
//! vocabulary. The markers live in one table so the evidence for each family
//! can be audited and extended without touching any broadcaster.

use shared::{Chain, ChainFamily, DuplicateSignal, Error};

/// A substring (case-sensitive) that identifies a re-submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateMarker {
    pub pattern: &'static str,
    pub signal: DuplicateSignal,
}

const fn already(pattern: &'static str) -> DuplicateMarker {
    DuplicateMarker {
        pattern,
        signal: DuplicateSignal::AlreadySubmitted,
    }
}

const fn sequence(pattern: &'static str) -> DuplicateMarker {
    DuplicateMarker {
        pattern,
        signal: DuplicateSignal::SequenceConflict,
    }
}

const EVM_MARKERS: &[DuplicateMarker] = &[
    already("already known"),
    already("transaction is temporarily banned"),
    sequence("nonce too low"),
    already("transaction already exists"),
    sequence("future transaction tries to replace pending"),
    sequence("could not replace existing tx"),
    already("tx already in mempool"),
];

const UTXO_MARKERS: &[DuplicateMarker] = &[
    already("BadInputsUTxO"),
    already("timed out"),
    already("txn-mempool-conflict"),
    already("already known"),
];

const SOLANA_MARKERS: &[DuplicateMarker] = &[
    already("already been processed"),
    already("AlreadyProcessed"),
];

const COSMOS_MARKERS: &[DuplicateMarker] = &[
    already("tx already exists in cache"),
    sequence("account sequence mismatch"),
];

const TON_MARKERS: &[DuplicateMarker] = &[already("duplicate message")];

// No confirmed markers yet.
const POLKADOT_MARKERS: &[DuplicateMarker] = &[];

const RIPPLE_MARKERS: &[DuplicateMarker] = &[sequence("tefPAST_SEQ"), already("tefALREADY")];

const SUI_MARKERS: &[DuplicateMarker] = &[already("Transaction already executed")];

const TRON_MARKERS: &[DuplicateMarker] = &[
    already("DUPLICATE_TRANSACTION"),
    already("DUP_TRANSACTION_ERROR"),
];

/// Ordered markers for a family
pub fn markers(family: ChainFamily) -> &'static [DuplicateMarker] {
    match family {
        ChainFamily::Evm => EVM_MARKERS,
        ChainFamily::Utxo => UTXO_MARKERS,
        ChainFamily::Solana => SOLANA_MARKERS,
        ChainFamily::Cosmos => COSMOS_MARKERS,
        ChainFamily::Ton => TON_MARKERS,
        ChainFamily::Polkadot => POLKADOT_MARKERS,
        ChainFamily::Ripple => RIPPLE_MARKERS,
        ChainFamily::Sui => SUI_MARKERS,
        ChainFamily::Tron => TRON_MARKERS,
    }
}

/// First marker of `family` found in `error_text`
pub fn classify(family: ChainFamily, error_text: &str) -> Option<DuplicateSignal> {
    markers(family)
        .iter()
        .find(|marker| error_text.contains(marker.pattern))
        .map(|marker| marker.signal)
}

pub fn looks_already_submitted(family: ChainFamily, error_text: &str) -> bool {
    classify(family, error_text).is_some()
}

/// A node rejected the submission with `message`
pub fn rejection(chain: Chain, message: impl Into<String>) -> Error {
    let message = message.into();
    let signal = classify(chain.family(), &message);
    Error::broadcast_failed(chain.name(), message, signal)
}

/// Wrap an unclassified failure, keeping it as the cause
pub fn wrap_failure(chain: Chain, err: anyhow::Error) -> Error {
    let message = format!("{:#}", err);
    let signal = classify(chain.family(), &message);
    Error::broadcast_failed(chain.name(), message, signal).with_cause(err)
}
