use async_trait::async_trait;
use shared::{Chain, ChainFamily};

/// Submits a signed transaction for one chain family.
///
/// Implementations return an already classified [`shared::Error`] (inside the
/// `anyhow::Error`) when the network rejects the transaction. Any other error
/// is wrapped and classified by the dispatcher.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    fn family(&self) -> ChainFamily;

    /// Returns the network's transaction id, verbatim
    async fn broadcast(&self, chain: Chain, raw_tx: &str) -> anyhow::Result<String>;
}
