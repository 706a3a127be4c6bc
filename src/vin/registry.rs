use crate::core::error::ScoutError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://vpic.nhtsa.dot.gov/api/vehicles/DecodeVinValues";

/// Longest upstream error body kept in a [`ScoutError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Raw decode response. `Results` holds one loosely-typed record per match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryResponse {
    #[serde(rename = "Count", default)]
    pub count: Option<u64>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    #[serde(rename = "Results", default)]
    pub results: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecsResponse {
    #[serde(rename = "Results", default)]
    pub results: Vec<SpecsRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecsRecord {
    #[serde(rename = "Specs", default)]
    pub specs: Vec<SpecPair>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpecPair {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Value,
}

impl SpecsResponse {
    /// Values of `Trim` and `Series` specs, minus `"N/A"` / `"null"` placeholders.
    pub fn trim_names(&self) -> Vec<String> {
        self.results
            .iter()
            .flat_map(|r| r.specs.iter())
            .filter(|pair| pair.name == "Trim" || pair.name == "Series")
            .filter_map(|pair| match &pair.value {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|v| !v.is_empty() && v != "N/A" && v != "null")
            .collect()
    }
}

/// Upstream VIN registry. Implementations return transport and status
/// failures as errors; the decoder turns them into `API_ERROR` results.
#[async_trait]
pub trait VinRegistry: Send + Sync {
    fn name(&self) -> &str;

    async fn decode(&self, vin: &str) -> Result<RegistryResponse, ScoutError>;

    /// Optional Canadian spec lookup. `Ok(None)` means the source is not configured.
    async fn canadian_specs(
        &self,
        _year: u16,
        _make: &str,
        _model: &str,
    ) -> Result<Option<SpecsResponse>, ScoutError> {
        Ok(None)
    }
}

/// NHTSA vPIC `DecodeVinValues` client, with an optional specs endpoint.
#[derive(Debug, Clone)]
pub struct NhtsaRegistry {
    client: reqwest::Client,
    base_url: String,
    specs_base_url: Option<String>,
}

impl NhtsaRegistry {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_REGISTRY_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            specs_base_url: None,
        }
    }

    pub fn with_specs_base_url(mut self, specs_base_url: Option<String>) -> Self {
        self.specs_base_url = specs_base_url.filter(|u| !u.trim().is_empty());
        self
    }

    fn decode_url(&self, vin: &str) -> Result<Url, ScoutError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ScoutError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|_| ScoutError::InvalidUrl {
                url: self.base_url.clone(),
                reason: "base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push(vin);
        url.query_pairs_mut().append_pair("format", "json");
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        endpoint: &str,
    ) -> Result<T, ScoutError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ScoutError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned HTTP {}", endpoint, status.as_u16());
            return Err(ScoutError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| ScoutError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|e| ScoutError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl VinRegistry for NhtsaRegistry {
    fn name(&self) -> &str {
        "nhtsa"
    }

    async fn decode(&self, vin: &str) -> Result<RegistryResponse, ScoutError> {
        let url = self.decode_url(vin)?;
        info!("VIN registry lookup: {}", vin);
        let response: RegistryResponse = self.get_json(url, &self.base_url).await?;
        debug!(
            "VIN registry returned {} record(s) for {}",
            response.results.len(),
            vin
        );
        Ok(response)
    }

    async fn canadian_specs(
        &self,
        year: u16,
        make: &str,
        model: &str,
    ) -> Result<Option<SpecsResponse>, ScoutError> {
        let Some(base) = self.specs_base_url.as_deref() else {
            return Ok(None);
        };
        let mut url = Url::parse(base).map_err(|e| ScoutError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("year", &year.to_string())
            .append_pair("make", make)
            .append_pair("model", model)
            .append_pair("format", "json");

        info!("Canadian spec lookup: {} {} {}", year, make, model);
        self.get_json(url, base).await.map(Some)
    }
}
