pub mod currency;
pub mod error;
pub mod journal;
pub mod market;
pub mod registry;
pub mod service;

pub use error::{ErrorKind, LedgerError};
pub use market::{Market, MarketConfig, MarketSnapshot};
pub use registry::RegistryConfig;
pub use service::{MarketHandle, MarketService};
