use crate::antibot;
use crate::core::error::ScoutError;
use crate::core::types::FetchMode;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

const MAX_ERROR_BODY_CHARS: usize = 300;

/// HTML returned by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderPage {
    pub html: String,
    /// Byte length reported by the provider's JSON envelope, if any.
    pub reported_bytes: Option<u64>,
    pub status: u16,
}

/// A way of retrieving a listing page. Failures are returned as errors and
/// are not retried here.
#[async_trait]
pub trait ScrapeProvider: Send + Sync {
    fn name(&self) -> &str;

    fn supports(&self, _mode: FetchMode) -> bool {
        true
    }

    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<ProviderPage, ScoutError>;
}

/// JSON envelope some scraping APIs wrap the page in.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    length: Option<u64>,
    #[serde(default)]
    bytes: Option<u64>,
}

/// Raw HTML, or the HTML inside a JSON envelope.
pub fn parse_provider_body(body: String, status: u16) -> ProviderPage {
    if body.trim_start().starts_with('{') {
        if let Ok(envelope) = serde_json::from_str::<Envelope>(&body) {
            let reported_bytes = envelope.length.or(envelope.bytes);
            if let Some(html) = envelope.html.or(envelope.content).or(envelope.body) {
                return ProviderPage {
                    html,
                    reported_bytes,
                    status,
                };
            }
        }
    }
    ProviderPage {
        html: body,
        reported_bytes: None,
        status,
    }
}

async fn read_page(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<ProviderPage, ScoutError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ScoutError::Transport {
            endpoint: endpoint.to_string(),
            source: e.without_url(),
        })?;

    if !status.is_success() {
        warn!("{} returned HTTP {}", endpoint, status.as_u16());
        return Err(ScoutError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }
    Ok(parse_provider_body(body, status.as_u16()))
}

/// External scraping API: `GET {endpoint}?url=..&render_js=..[&api_key=..]`.
#[derive(Clone)]
pub struct HttpScrapeProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpScrapeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpScrapeProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpScrapeProvider {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn request_url(&self, target: &str, mode: FetchMode) -> Result<Url, ScoutError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| ScoutError::InvalidUrl {
            url: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("url", target)
                .append_pair("render_js", if mode == FetchMode::Rendered { "true" } else { "false" });
            if let Some(key) = &self.api_key {
                query.append_pair("api_key", key);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ScrapeProvider for HttpScrapeProvider {
    fn name(&self) -> &str {
        "scraper-api"
    }

    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<ProviderPage, ScoutError> {
        let request_url = self.request_url(url, mode)?;
        info!("Scrape provider request: {} ({})", url, mode.as_str());

        // Errors carry the bare endpoint; the request URL holds the API key.
        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| ScoutError::Transport {
                endpoint: self.endpoint.clone(),
                source: e.without_url(),
            })?;

        let page = read_page(response, &self.endpoint).await?;
        debug!(
            "Scrape provider returned {} bytes for {} (reported {:?})",
            page.html.len(),
            url,
            page.reported_bytes
        );
        Ok(page)
    }
}

/// Direct page fetch with browser-like headers. Static HTML only.
#[derive(Debug, Clone)]
pub struct DirectFetcher {
    client: reqwest::Client,
}

impl DirectFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScrapeProvider for DirectFetcher {
    fn name(&self) -> &str {
        "direct"
    }

    fn supports(&self, mode: FetchMode) -> bool {
        mode == FetchMode::Static
    }

    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<ProviderPage, ScoutError> {
        if mode == FetchMode::Rendered {
            return Err(ScoutError::RenderingUnavailable);
        }
        info!("Direct fetch: {}", url);
        let response = self
            .client
            .get(url)
            .headers(antibot::stealth_headers())
            .send()
            .await
            .map_err(|source| ScoutError::Transport {
                endpoint: url.to_string(),
                source,
            })?;
        read_page(response, url).await
    }
}
