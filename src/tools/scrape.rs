use crate::core::error::{ErrorCode, ScoutError};
use crate::core::types::{
    ExtractedListing, FetchMode, ScrapeDiagnostics, ScrapeOutcome, ScrapeRequest, VinDecodeResult,
};
use crate::listing::{text, ListingExtractor};
use crate::scraping::{detect_block_reason, ScrapeProvider};
use crate::vin::VinDecoder;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// `None` uses the orchestrator's default mode.
    pub mode: Option<FetchMode>,
    pub cross_check_vin: bool,
    pub preview_chars: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            mode: None,
            cross_check_vin: true,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl From<&ScrapeRequest> for ScrapeOptions {
    fn from(request: &ScrapeRequest) -> Self {
        let defaults = ScrapeOptions::default();
        Self {
            mode: request.mode,
            cross_check_vin: request.cross_check_vin.unwrap_or(defaults.cross_check_vin),
            preview_chars: request.preview_chars.unwrap_or(defaults.preview_chars),
        }
    }
}

/// Absolute `http`/`https` URL with a host.
pub fn validate_listing_url(raw: &str) -> Result<Url, ScoutError> {
    let invalid = |reason: &str| ScoutError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("must start with http:// or https://"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(url)
}

/// Fetches listing pages through a [`ScrapeProvider`] and extracts vehicle
/// fields. Every failure comes back as a [`ScrapeOutcome`]; nothing is retried.
pub struct ScrapeOrchestrator {
    /// In preference order; the first one supporting the requested mode is used.
    providers: Vec<Arc<dyn ScrapeProvider>>,
    extractor: Arc<ListingExtractor>,
    decoder: Option<Arc<VinDecoder>>,
    default_mode: FetchMode,
}

impl std::fmt::Debug for ScrapeOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeOrchestrator")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("cross_check", &self.decoder.is_some())
            .field("default_mode", &self.default_mode)
            .finish()
    }
}

impl ScrapeOrchestrator {
    pub fn new(providers: Vec<Arc<dyn ScrapeProvider>>, extractor: Arc<ListingExtractor>) -> Self {
        Self {
            providers,
            extractor,
            decoder: None,
            default_mode: FetchMode::Static,
        }
    }

    pub fn with_vin_decoder(mut self, decoder: Arc<VinDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn with_default_mode(mut self, mode: FetchMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn default_mode(&self) -> FetchMode {
        self.default_mode
    }

    fn provider_for(&self, mode: FetchMode) -> Option<&Arc<dyn ScrapeProvider>> {
        self.providers.iter().find(|p| p.supports(mode))
    }

    pub async fn fetch_and_extract(&self, url: &str, options: &ScrapeOptions) -> ScrapeOutcome {
        let started = Instant::now();
        let finish = |mut outcome: ScrapeOutcome| {
            outcome.duration_ms = started.elapsed().as_millis() as u64;
            outcome
        };

        let target = match validate_listing_url(url) {
            Ok(target) => target,
            Err(e) => {
                info!("Rejecting scrape of '{}': {}", url, e);
                return finish(ScrapeOutcome::failure(url, e.to_string(), e.code()));
            }
        };

        let mode = options.mode.unwrap_or(self.default_mode);
        let Some(provider) = self.provider_for(mode) else {
            let e = ScoutError::RenderingUnavailable;
            warn!("No provider for {} mode: {}", mode.as_str(), url);
            return finish(ScrapeOutcome::failure(url, e.to_string(), e.code()));
        };

        let request_id = uuid::Uuid::new_v4().to_string();
        info!(
            "[{}] Scraping {} via {} ({})",
            request_id,
            target,
            provider.name(),
            mode.as_str()
        );

        let page = match provider.fetch(target.as_str(), mode).await {
            Ok(page) => page,
            Err(e) => {
                warn!("[{}] {} failed for {}: {}", request_id, provider.name(), target, e);
                let message = format!("{} provider failed: {}", provider.name(), e);
                return finish(ScrapeOutcome::failure(url, message, e.code()));
            }
        };

        let trace = self.extractor.extract_with_trace(&page.html);
        let mut listing = trace.listing;
        let mut warnings = Vec::new();

        let block_hint = detect_block_reason(&page.html);
        if let Some(hint) = block_hint {
            warn!("[{}] {} looks like a {} page", request_id, target, hint);
            warnings.push(format!(
                "Page looks like a {} interstitial; listing fields may be missing",
                hint
            ));
        }

        let vin_decode = match (&self.decoder, listing.vin.clone()) {
            (Some(decoder), Some(vin)) if options.cross_check_vin => {
                let decoded = decoder.decode_vin(&vin).await;
                cross_check(&mut listing, &decoded, &self.extractor, &mut warnings);
                Some(decoded)
            }
            _ => None,
        };

        debug!(
            "[{}] Extracted {} field(s) from {} bytes",
            request_id,
            listing.field_count(),
            page.html.len()
        );

        let diagnostics = ScrapeDiagnostics {
            request_id,
            provider: provider.name().to_string(),
            mode,
            html_bytes: page.html.len(),
            reported_bytes: page.reported_bytes,
            preview: text::preview(&text::visible_text(&page.html), options.preview_chars),
            matches: trace.matches,
            block_hint: block_hint.map(str::to_string),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        };

        finish(ScrapeOutcome {
            url: url.to_string(),
            success: true,
            listing,
            diagnostics: Some(diagnostics),
            vin_decode,
            error: None,
            error_code: None,
            warnings,
            duration_ms: 0,
        })
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Compare the listing with a decode of its VIN. Disagreements become
/// warnings; absent listing fields are filled from a successful decode.
/// A filled make is reported in the catalog's spelling, as detected makes are.
fn cross_check(
    listing: &mut ExtractedListing,
    decoded: &VinDecodeResult,
    extractor: &ListingExtractor,
    warnings: &mut Vec<String>,
) {
    if !decoded.is_success() {
        let code = decoded
            .error_code
            .as_ref()
            .map(ErrorCode::as_str)
            .unwrap_or("UNKNOWN");
        warnings.push(format!(
            "VIN cross-check failed ({}): {}",
            code,
            decoded.error.as_deref().unwrap_or("no details")
        ));
        return;
    }

    match (listing.year, decoded.year) {
        (Some(listed), Some(registry)) if listed != registry => warnings.push(format!(
            "Listing year {} disagrees with VIN decode {}",
            listed, registry
        )),
        (None, Some(registry)) => listing.year = Some(registry),
        _ => {}
    }

    match (&listing.make, &decoded.make) {
        (Some(listed), Some(registry)) if !same_text(listed, registry) => warnings.push(format!(
            "Listing make {} disagrees with VIN decode {}",
            listed, registry
        )),
        (None, Some(registry)) => {
            listing.make = Some(
                extractor
                    .canonical_make(registry)
                    .unwrap_or_else(|| registry.clone()),
            )
        }
        _ => {}
    }

    match (&listing.model, &decoded.model) {
        (Some(listed), Some(registry)) if !same_text(listed, registry) => warnings.push(format!(
            "Listing model {} disagrees with VIN decode {}",
            listed, registry
        )),
        (None, Some(registry)) => listing.model = Some(registry.clone()),
        _ => {}
    }
}
