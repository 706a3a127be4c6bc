pub mod antibot;
pub mod catalog;
pub mod core;
pub mod http;
pub mod listing;
pub mod scraping;
pub mod tools;
pub mod vin;

// --- Primary core exports ---
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::{AppState, ErrorCode, ScoutError};

// --- Pipeline entry points ---
pub use catalog::resolver::resolve_trims;
pub use catalog::{TrimCatalog, TrimResolver};
pub use listing::{extract, extract_with_trace, ListingExtractor};
pub use tools::{decode_batch, scrape, ScrapeOptions, ScrapeOrchestrator};
pub use vin::{VinCache, VinCacheConfig, VinDecoder};
