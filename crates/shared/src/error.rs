use std::error::Error as StdError;
use thiserror::Error;

/// Boxed underlying failure kept for diagnostics
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Why a rejection suggests the transaction may already be on the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateSignal {
    /// The network already has this exact transaction
    AlreadySubmitted,
    /// The nonce/sequence slot is already consumed, possibly by this transaction
    SequenceConflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedChain,
    BroadcastFailed,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported chain {chain}: {reason}")]
    UnsupportedChain { chain: String, reason: String },

    #[error("Broadcast failed on {chain}: {message}")]
    BroadcastFailed {
        chain: String,
        message: String,
        possibly_already_submitted: bool,
        signal: Option<DuplicateSignal>,
        #[source]
        cause: Option<Cause>,
    },
}

impl Error {
    pub fn unsupported_chain(chain: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedChain {
            chain: chain.into(),
            reason: reason.into(),
        }
    }

    /// Build a broadcast failure; `signal` decides `possibly_already_submitted`
    pub fn broadcast_failed(
        chain: impl Into<String>,
        message: impl Into<String>,
        signal: Option<DuplicateSignal>,
    ) -> Self {
        Error::BroadcastFailed {
            chain: chain.into(),
            message: message.into(),
            possibly_already_submitted: signal.is_some(),
            signal,
            cause: None,
        }
    }

    /// Attach the underlying error. No-op for `UnsupportedChain`.
    pub fn with_cause(mut self, source: impl Into<Cause>) -> Self {
        if let Error::BroadcastFailed { cause, .. } = &mut self {
            *cause = Some(source.into());
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedChain { .. } => ErrorKind::UnsupportedChain,
            Error::BroadcastFailed { .. } => ErrorKind::BroadcastFailed,
        }
    }

    pub fn is_unsupported_chain(&self) -> bool {
        self.kind() == ErrorKind::UnsupportedChain
    }

    /// Callers must check this before resending: when true, funds may
    /// already have moved.
    pub fn possibly_already_submitted(&self) -> bool {
        match self {
            Error::BroadcastFailed {
                possibly_already_submitted,
                ..
            } => *possibly_already_submitted,
            Error::UnsupportedChain { .. } => false,
        }
    }

    pub fn duplicate_signal(&self) -> Option<DuplicateSignal> {
        match self {
            Error::BroadcastFailed { signal, .. } => *signal,
            Error::UnsupportedChain { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::UnsupportedChain { reason, .. } => reason,
            Error::BroadcastFailed { message, .. } => message,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
