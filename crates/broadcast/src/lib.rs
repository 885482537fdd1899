pub mod broadcaster;
pub mod classifier;
pub mod cosmos;
pub mod decode;
pub mod dispatcher;
pub mod evm;
pub mod jsonrpc;
pub mod polkadot;
pub mod ripple;
pub mod solana;
pub mod sui;
pub mod ton;
pub mod tron;
pub mod utxo;

pub use broadcaster::Broadcaster;
pub use classifier::{classify, looks_already_submitted, DuplicateMarker};
pub use decode::{CosmosEncoding, Decoded, SolanaEncoding};
pub use dispatcher::BroadcastDispatcher;
pub use shared::{BroadcastConfig, Chain, ChainFamily, DuplicateSignal, Error, ErrorKind, Result};
