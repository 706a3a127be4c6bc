use crate::catalog::{TrimCatalog, TrimResolver};
use crate::core::config::ScoutConfig;
use crate::listing::ListingExtractor;
use crate::scraping::{DirectFetcher, HttpScrapeProvider, ScrapeProvider};
use crate::tools::ScrapeOrchestrator;
use crate::vin::{NhtsaRegistry, VinCache, VinDecoder, VinRegistry};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub trim_resolver: Arc<TrimResolver>,
    pub vin_decoder: Arc<VinDecoder>,
    pub extractor: Arc<ListingExtractor>,
    pub scraper: Arc<ScrapeOrchestrator>,
    pub batch_concurrency: usize,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("vin_decoder", &self.vin_decoder)
            .field("scraper", &self.scraper)
            .field("batch_concurrency", &self.batch_concurrency)
            .finish()
    }
}

impl AppState {
    /// Wire the pipeline from config. Fails only when a configured trim
    /// catalog file cannot be loaded.
    pub fn new(http_client: reqwest::Client, config: ScoutConfig) -> anyhow::Result<Self> {
        let catalog = match config.resolve_trim_catalog_path() {
            Some(path) => TrimCatalog::load_from_path(&path)
                .with_context(|| format!("loading trim catalog {}", path.display()))?,
            None => TrimCatalog::builtin(),
        };
        let catalog = Arc::new(catalog);

        let registry: Arc<dyn VinRegistry> = Arc::new(
            NhtsaRegistry::with_base_url(http_client.clone(), config.resolve_vin_registry_base_url())
                .with_specs_base_url(config.resolve_canadian_specs_base_url()),
        );

        let mut providers: Vec<Arc<dyn ScrapeProvider>> = Vec::new();
        match config.resolve_scraper_endpoint() {
            Some(endpoint) => {
                info!("Scraping provider configured: {}", endpoint);
                providers.push(Arc::new(HttpScrapeProvider::new(
                    http_client.clone(),
                    endpoint,
                    config.resolve_scraper_api_key(),
                )));
            }
            None => info!("SCRAPER_ENDPOINT not set. Static pages are fetched directly; rendered mode disabled."),
        }
        providers.push(Arc::new(DirectFetcher::new(http_client.clone())));

        Ok(Self::from_parts(&config, catalog, registry, providers))
    }

    /// Wire the pipeline around explicit collaborators.
    pub fn from_parts(
        config: &ScoutConfig,
        catalog: Arc<TrimCatalog>,
        registry: Arc<dyn VinRegistry>,
        providers: Vec<Arc<dyn ScrapeProvider>>,
    ) -> Self {
        let trim_resolver = Arc::new(TrimResolver::new(catalog.clone()));
        let vin_decoder = Arc::new(VinDecoder::new(
            registry,
            trim_resolver.clone(),
            VinCache::new(config.resolve_vin_cache()),
        ));
        let extractor = Arc::new(ListingExtractor::new(&catalog));
        let scraper = Arc::new(
            ScrapeOrchestrator::new(providers, extractor.clone())
                .with_vin_decoder(vin_decoder.clone())
                .with_default_mode(config.resolve_default_fetch_mode()),
        );

        Self {
            batch_concurrency: config.resolve_batch_concurrency(),
            trim_resolver,
            vin_decoder,
            extractor,
            scraper,
        }
    }
}
