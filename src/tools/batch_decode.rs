use crate::core::types::VinBatchResponse;
use crate::vin::VinDecoder;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::info;

/// Decode many VINs with bounded concurrency. Results keep input order;
/// each entry succeeds or fails independently.
pub async fn decode_batch(
    decoder: &VinDecoder,
    vins: Vec<String>,
    max_concurrent: usize,
) -> VinBatchResponse {
    let start_time = Instant::now();
    let total = vins.len();
    let max_concurrent = max_concurrent.max(1);

    info!(
        "Starting batch decode of {} VINs (concurrency: {})",
        total, max_concurrent
    );

    let results: Vec<_> = stream::iter(vins)
        .map(|vin| async move { decoder.decode_vin(&vin).await })
        .buffered(max_concurrent)
        .collect()
        .await;

    let decoded = results.iter().filter(|r| r.is_success()).count();
    let total_duration_ms = start_time.elapsed().as_millis() as u64;

    info!(
        "Batch decode completed: {}/{} decoded in {}ms",
        decoded, total, total_duration_ms
    );

    VinBatchResponse {
        total,
        decoded,
        failed: total - decoded,
        total_duration_ms,
        results,
    }
}
