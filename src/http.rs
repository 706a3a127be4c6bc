use crate::core::types::{
    ErrorResponse, ExtractRequest, ExtractResponse, ScrapeOutcome, ScrapeRequest, TrimQuery,
    TrimResolution, VinBatchRequest, VinBatchResponse, VinCacheStats, VinDecodeResult,
};
use crate::tools::{decode_batch, ScrapeOptions};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Largest accepted `POST /vin/batch` request.
pub const MAX_BATCH_VINS: usize = 100;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    let error = message.into();
    warn!("Rejected request: {}", error);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/vin/batch", post(vin_batch_handler))
        .route("/vin/cache", get(vin_cache_stats_handler).delete(vin_cache_clear_handler))
        .route("/vin/{vin}", get(vin_decode_handler))
        .route("/trims", get(trims_handler))
        .route("/listing/extract", post(listing_extract_handler))
        .route("/listing/scrape", post(listing_scrape_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "vehicle-scout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn vin_decode_handler(
    State(state): State<Arc<AppState>>,
    Path(vin): Path<String>,
) -> Json<VinDecodeResult> {
    Json(state.vin_decoder.decode_vin(&vin).await)
}

async fn vin_batch_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VinBatchRequest>, JsonRejection>,
) -> Result<Json<VinBatchResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_request(e.body_text()))?;
    if request.vins.len() > MAX_BATCH_VINS {
        return Err(bad_request(format!(
            "at most {} VINs per batch (got {})",
            MAX_BATCH_VINS,
            request.vins.len()
        )));
    }
    Ok(Json(
        decode_batch(&state.vin_decoder, request.vins, state.batch_concurrency).await,
    ))
}

async fn vin_cache_stats_handler(State(state): State<Arc<AppState>>) -> Json<VinCacheStats> {
    Json(state.vin_decoder.cache_stats().await)
}

async fn vin_cache_clear_handler(State(state): State<Arc<AppState>>) -> Json<VinCacheStats> {
    state.vin_decoder.clear_cache().await;
    Json(state.vin_decoder.cache_stats().await)
}

async fn trims_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TrimQuery>, QueryRejection>,
) -> Result<Json<TrimResolution>, ApiError> {
    let Query(query) = query.map_err(|e| bad_request(e.body_text()))?;
    let make = query.make.unwrap_or_default();
    Ok(Json(state.trim_resolver.resolution(&make)))
}

async fn listing_extract_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_request(e.body_text()))?;
    let response = state.extractor.extract_with_trace(&request.html);
    info!(
        "Extracted {} field(s) from {} bytes of HTML",
        response.listing.field_count(),
        request.html.len()
    );
    Ok(Json(response))
}

async fn listing_scrape_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeOutcome>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_request(e.body_text()))?;
    let options = ScrapeOptions::from(&request);
    Ok(Json(state.scraper.fetch_and_extract(&request.url, &options).await))
}
