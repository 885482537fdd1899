pub mod chain;
pub mod config;
pub mod error;
pub mod logging;

pub use chain::{Chain, ChainFamily};
pub use config::BroadcastConfig;
pub use error::{DuplicateSignal, Error, ErrorKind, Result};
