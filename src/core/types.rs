use serde::{Deserialize, Serialize};

use super::error::ErrorCode;

// ───────────────────────────────────────────────────────────────────────────
// VIN decoding
// ───────────────────────────────────────────────────────────────────────────

/// Normalized outcome of a VIN decode.
///
/// Either `error` is set and nothing beyond `vin` (and `warnings`) is
/// populated, or `error` is absent and the vehicle fields hold whatever the
/// registry could supply.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VinDecodeResult {
    pub vin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_count: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_cylinder_count: Option<u8>,
    /// Displacement in litres, as reported (e.g. `"2.0"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_displacement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_city: Option<String>,
    /// Sorted, deduplicated.
    #[serde(default)]
    pub canadian_trims: Vec<String>,
    #[serde(default)]
    pub has_canadian_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl VinDecodeResult {
    pub fn failure(vin: impl Into<String>, error: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            vin: vin.into(),
            error: Some(error.into()),
            error_code: Some(code),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// True when any field derived from the registry is populated.
    pub fn has_vehicle_fields(&self) -> bool {
        self.year.is_some()
            || self.make.is_some()
            || self.model.is_some()
            || self.trim.is_some()
            || self.series.is_some()
            || self.body_class.is_some()
            || self.vehicle_type.is_some()
            || self.door_count.is_some()
            || self.engine_description.is_some()
            || self.engine_cylinder_count.is_some()
            || self.engine_displacement.is_some()
            || self.fuel_type.is_some()
            || self.drive_type.is_some()
            || self.transmission_style.is_some()
            || self.manufacturer.is_some()
            || self.plant_country.is_some()
            || self.plant_state.is_some()
            || self.plant_city.is_some()
            || !self.canadian_trims.is_empty()
            || self.has_canadian_data
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VinBatchRequest {
    pub vins: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VinBatchResponse {
    pub total: usize,
    pub decoded: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
    pub results: Vec<VinDecodeResult>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VinCacheStats {
    pub entries: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
}

// ───────────────────────────────────────────────────────────────────────────
// Trim resolution
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct TrimQuery {
    #[serde(default)]
    pub make: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrimResolution {
    pub make: String,
    /// Name of the matcher tier that produced the match (`"fallback"` for `"Other"`).
    pub tier: String,
    pub catalog_key: String,
    pub trims: Vec<String>,
}

// ───────────────────────────────────────────────────────────────────────────
// Listing extraction
// ───────────────────────────────────────────────────────────────────────────

/// Vehicle fields recovered from a listing page. Every field is independent;
/// an all-`None` listing means nothing was recognized.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kilometers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ExtractedListing {
    pub fn is_empty(&self) -> bool {
        *self == ExtractedListing::default()
    }

    pub fn field_count(&self) -> usize {
        [
            self.year.is_some(),
            self.make.is_some(),
            self.model.is_some(),
            self.vin.is_some(),
            self.price.is_some(),
            self.kilometers.is_some(),
            self.stock_number.is_some(),
            self.color.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Raw candidate tokens per detector, in document order.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectorMatches {
    #[serde(default)]
    pub vin: Vec<String>,
    #[serde(default)]
    pub year: Vec<String>,
    #[serde(default)]
    pub make_model: Vec<String>,
    #[serde(default)]
    pub price: Vec<String>,
    #[serde(default)]
    pub kilometers: Vec<String>,
    #[serde(default)]
    pub stock_number: Vec<String>,
    #[serde(default)]
    pub color: Vec<String>,
    /// `@type` of each JSON-LD vehicle block that carried usable fields.
    #[serde(default)]
    pub structured_data: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub html: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub listing: ExtractedListing,
    pub matches: DetectorMatches,
}

// ───────────────────────────────────────────────────────────────────────────
// Scraping
// ───────────────────────────────────────────────────────────────────────────

/// Retrieval path for a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Plain HTML as served. Cheap.
    #[default]
    Static,
    /// HTML after JavaScript execution by the provider. Expensive.
    Rendered,
}

impl FetchMode {
    pub fn parse_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "static" | "html" => Some(FetchMode::Static),
            "rendered" | "render" | "js" => Some(FetchMode::Rendered),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::Static => "static",
            FetchMode::Rendered => "rendered",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(default)]
    pub mode: Option<FetchMode>,
    #[serde(default)]
    pub cross_check_vin: Option<bool>,
    #[serde(default)]
    pub preview_chars: Option<usize>,
}

/// Operator-facing details about a scrape. Not part of the vehicle data.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeDiagnostics {
    pub request_id: String,
    pub provider: String,
    pub mode: FetchMode,
    pub html_bytes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_bytes: Option<u64>,
    pub preview: String,
    pub matches: DetectorMatches,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hint: Option<String>,
    pub fetched_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    pub url: String,
    pub success: bool,
    pub listing: ExtractedListing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<ScrapeDiagnostics>,
    /// Registry decode of the VIN found on the page, when cross-checking ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin_decode: Option<VinDecodeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

impl ScrapeOutcome {
    pub fn failure(url: impl Into<String>, error: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            url: url.into(),
            success: false,
            listing: ExtractedListing::default(),
            diagnostics: None,
            vin_decode: None,
            error: Some(error.into()),
            error_code: Some(code),
            warnings: Vec::new(),
            duration_ms: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_result_has_no_vehicle_fields() {
        let r = VinDecodeResult::failure("1HGCM", "too short", ErrorCode::InvalidVin);
        assert!(!r.is_success());
        assert!(!r.has_vehicle_fields());
    }

    #[test]
    fn decode_result_serializes_camel_case_and_skips_absent_fields() {
        let r = VinDecodeResult {
            vin: "1HGCM82633A004352".into(),
            make: Some("Honda".into()),
            body_class: Some("Sedan/Saloon".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["bodyClass"], "Sedan/Saloon");
        assert_eq!(v["hasCanadianData"], false);
        assert!(v.get("model").is_none());
        assert!(v.get("errorCode").is_none());
    }

    #[test]
    fn fetch_mode_parses_aliases() {
        assert_eq!(FetchMode::parse_str("JS"), Some(FetchMode::Rendered));
        assert_eq!(FetchMode::parse_str(" static "), Some(FetchMode::Static));
        assert_eq!(FetchMode::parse_str("headless"), None);
    }

    #[test]
    fn listing_field_count() {
        let listing = ExtractedListing {
            price: Some(24_995),
            kilometers: Some(45_000),
            ..Default::default()
        };
        assert_eq!(listing.field_count(), 2);
        assert!(!listing.is_empty());
        assert!(ExtractedListing::default().is_empty());
    }
}
