use crate::core::types::FetchMode;
use crate::vin::registry::DEFAULT_REGISTRY_BASE_URL;
use crate::vin::VinCacheConfig;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ScoutConfig: file-based config (vehicle-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const CONFIG_FILE_NAME: &str = "vehicle-scout.json";
pub const ENV_CONFIG_PATH: &str = "VEHICLE_SCOUT_CONFIG";

pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Top-level config loaded from `vehicle-scout.json`. Every field is
/// optional; absent fields fall back to an environment variable, then to a
/// built-in default.
#[derive(serde::Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct ScoutConfig {
    /// VIN registry decode endpoint. The VIN is appended as a path segment.
    pub vin_registry_base_url: Option<String>,
    /// Canadian spec lookup endpoint. Unset disables the enrichment.
    pub canadian_specs_base_url: Option<String>,
    /// External scraping API. Unset means static pages are fetched directly
    /// and rendered mode is unavailable.
    pub scraper_endpoint: Option<String>,
    /// Scraping API key. Never logged.
    pub scraper_api_key: Option<String>,
    /// `static` or `rendered`.
    pub default_fetch_mode: Option<String>,
    pub vin_cache_max_entries: Option<u64>,
    pub vin_cache_ttl_secs: Option<u64>,
    pub batch_concurrency: Option<usize>,
    /// JSON trim catalog replacing the built-in one.
    pub trim_catalog_path: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub http_connect_timeout_secs: Option<u64>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

impl ScoutConfig {
    /// JSON field → `VIN_REGISTRY_BASE_URL` → NHTSA vPIC.
    pub fn resolve_vin_registry_base_url(&self) -> String {
        non_blank(&self.vin_registry_base_url)
            .or_else(|| env_string("VIN_REGISTRY_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_REGISTRY_BASE_URL.to_string())
    }

    /// JSON field → `CANADIAN_SPECS_BASE_URL` → disabled.
    pub fn resolve_canadian_specs_base_url(&self) -> Option<String> {
        non_blank(&self.canadian_specs_base_url).or_else(|| env_string("CANADIAN_SPECS_BASE_URL"))
    }

    /// JSON field → `SCRAPER_ENDPOINT` → none.
    pub fn resolve_scraper_endpoint(&self) -> Option<String> {
        non_blank(&self.scraper_endpoint).or_else(|| env_string("SCRAPER_ENDPOINT"))
    }

    /// JSON field → `SCRAPER_API_KEY` → none.
    pub fn resolve_scraper_api_key(&self) -> Option<String> {
        non_blank(&self.scraper_api_key).or_else(|| env_string("SCRAPER_API_KEY"))
    }

    /// JSON field → `SCRAPE_DEFAULT_MODE` → static. Unknown values fall back to static.
    pub fn resolve_default_fetch_mode(&self) -> FetchMode {
        let Some(raw) = non_blank(&self.default_fetch_mode).or_else(|| env_string("SCRAPE_DEFAULT_MODE"))
        else {
            return FetchMode::Static;
        };
        FetchMode::parse_str(&raw).unwrap_or_else(|| {
            tracing::warn!("Unknown default fetch mode '{}'; using static", raw);
            FetchMode::Static
        })
    }

    /// `VIN_CACHE_MAX_ENTRIES` / `VIN_CACHE_TTL_SECS`. Unset means unbounded
    /// and never-expiring. A zero TTL is treated as unset.
    pub fn resolve_vin_cache(&self) -> VinCacheConfig {
        let max_entries = self
            .vin_cache_max_entries
            .or_else(|| env_parsed("VIN_CACHE_MAX_ENTRIES"));
        let ttl = self
            .vin_cache_ttl_secs
            .or_else(|| env_parsed("VIN_CACHE_TTL_SECS"))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        VinCacheConfig { max_entries, ttl }
    }

    /// JSON field → `VIN_BATCH_CONCURRENCY` → 4. Never below 1.
    pub fn resolve_batch_concurrency(&self) -> usize {
        self.batch_concurrency
            .or_else(|| env_parsed("VIN_BATCH_CONCURRENCY"))
            .unwrap_or(DEFAULT_BATCH_CONCURRENCY)
            .max(1)
    }

    /// JSON field → `TRIM_CATALOG_PATH` → built-in catalog.
    pub fn resolve_trim_catalog_path(&self) -> Option<PathBuf> {
        non_blank(&self.trim_catalog_path)
            .or_else(|| env_string("TRIM_CATALOG_PATH"))
            .map(PathBuf::from)
    }

    pub fn resolve_http_timeout(&self) -> Duration {
        Duration::from_secs(
            self.http_timeout_secs
                .or_else(|| env_parsed("HTTP_TIMEOUT_SECS"))
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        )
    }

    pub fn resolve_http_connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.http_connect_timeout_secs
                .or_else(|| env_parsed("HTTP_CONNECT_TIMEOUT_SECS"))
                .unwrap_or(DEFAULT_HTTP_CONNECT_TIMEOUT_SECS),
        )
    }
}

/// Read and parse one config file.
pub fn load_config_from(path: &Path) -> anyhow::Result<ScoutConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Load `vehicle-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `VEHICLE_SCOUT_CONFIG` env var path
/// 2. `./vehicle-scout.json`
/// 3. `../vehicle-scout.json`
///
/// Missing file → `ScoutConfig::default()` (all env-var fallbacks apply).
/// Parse error → warning, then `ScoutConfig::default()`.
pub fn load_config() -> ScoutConfig {
    let mut candidates = vec![
        PathBuf::from(CONFIG_FILE_NAME),
        PathBuf::from("..").join(CONFIG_FILE_NAME),
    ];
    if let Some(env_path) = env_string(ENV_CONFIG_PATH) {
        candidates.insert(0, PathBuf::from(env_path));
    }

    for path in &candidates {
        if !path.is_file() {
            continue;
        }
        return match load_config_from(path) {
            Ok(cfg) => {
                tracing::info!("{} loaded from {}", CONFIG_FILE_NAME, path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!("{:#}; using defaults", e);
                ScoutConfig::default()
            }
        };
    }

    ScoutConfig::default()
}
