pub mod batch_decode;
pub mod scrape;

pub use batch_decode::decode_batch;
pub use scrape::{ScrapeOptions, ScrapeOrchestrator};
