pub mod block;
pub mod provider;

pub use block::detect_block_reason;
pub use provider::{DirectFetcher, HttpScrapeProvider, ProviderPage, ScrapeProvider};
