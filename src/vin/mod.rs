pub mod aliases;
pub mod cache;
pub mod check_digit;
pub mod registry;

pub use cache::{VinCache, VinCacheConfig};
pub use registry::{NhtsaRegistry, RegistryResponse, SpecsResponse, VinRegistry};

use crate::catalog::TrimResolver;
use crate::core::error::ErrorCode;
use crate::core::types::{VinCacheStats, VinDecodeResult};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const MIN_VIN_LENGTH: usize = 11;

pub const INVALID_VIN_MESSAGE: &str = "VIN must be at least 11 characters long";
pub const NOT_FOUND_MESSAGE: &str = "VIN not found in NHTSA database";
pub const NO_DATA_MESSAGE: &str = "Unable to decode VIN: registry returned no make, model or year";

/// Trimmed, upper-cased VIN, or `None` when shorter than [`MIN_VIN_LENGTH`].
pub fn normalize_vin(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_VIN_LENGTH {
        return None;
    }
    Some(trimmed.to_uppercase())
}

/// Map the first registry record onto the internal result shape.
fn map_record(vin: &str, record: &Map<String, Value>) -> VinDecodeResult {
    use aliases::*;

    VinDecodeResult {
        vin: vin.to_string(),
        year: first_number(record, YEAR),
        make: first_value(record, MAKE).map(|m| capitalize_first(&m)),
        model: first_value(record, MODEL).map(|m| capitalize_first(&m)),
        trim: first_value(record, TRIM),
        series: first_value(record, SERIES),
        body_class: first_value(record, BODY_CLASS),
        vehicle_type: first_value(record, VEHICLE_TYPE),
        door_count: first_number(record, DOOR_COUNT),
        engine_description: first_value(record, ENGINE_DESCRIPTION),
        engine_cylinder_count: first_number(record, ENGINE_CYLINDERS),
        engine_displacement: first_value(record, ENGINE_DISPLACEMENT),
        fuel_type: first_value(record, FUEL_TYPE),
        drive_type: first_value(record, DRIVE_TYPE),
        transmission_style: first_value(record, TRANSMISSION_STYLE),
        manufacturer: first_value(record, MANUFACTURER),
        plant_country: first_value(record, PLANT_COUNTRY),
        plant_state: first_value(record, PLANT_STATE),
        plant_city: first_value(record, PLANT_CITY),
        ..Default::default()
    }
}

/// Upstream error code, unless it is blank or the registry's "clean decode" `0`.
fn upstream_error_code(record: &Map<String, Value>) -> Option<String> {
    aliases::first_value(record, aliases::ERROR_CODE).filter(|c| c != "0")
}

/// Decodes VINs through a [`VinRegistry`], memoizing successes.
pub struct VinDecoder {
    registry: Arc<dyn VinRegistry>,
    trims: Arc<TrimResolver>,
    cache: VinCache,
}

impl std::fmt::Debug for VinDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VinDecoder")
            .field("registry", &self.registry.name())
            .field("cache", &self.cache)
            .finish()
    }
}

impl VinDecoder {
    pub fn new(registry: Arc<dyn VinRegistry>, trims: Arc<TrimResolver>, cache: VinCache) -> Self {
        Self {
            registry,
            trims,
            cache,
        }
    }

    pub fn cache(&self) -> &VinCache {
        &self.cache
    }

    pub async fn clear_cache(&self) {
        info!("Clearing VIN decode cache");
        self.cache.clear().await;
    }

    pub async fn cache_stats(&self) -> VinCacheStats {
        self.cache.stats().await
    }

    /// Decode a VIN. Never fails: every failure comes back as a result with
    /// `error` and `error_code` set.
    pub async fn decode_vin(&self, raw_vin: &str) -> VinDecodeResult {
        let Some(vin) = normalize_vin(raw_vin) else {
            debug!("Rejecting VIN '{}': too short", raw_vin);
            return VinDecodeResult::failure(raw_vin, INVALID_VIN_MESSAGE, ErrorCode::InvalidVin);
        };

        if let Some(cached) = self.cache.get(&vin).await {
            debug!("VIN cache hit: {}", vin);
            return cached;
        }

        let response = match self.registry.decode(&vin).await {
            Ok(r) => r,
            Err(e) => {
                warn!("VIN registry call failed for {}: {}", vin, e);
                return VinDecodeResult::failure(
                    vin,
                    format!("VIN registry request failed: {}", e),
                    ErrorCode::ApiError,
                );
            }
        };

        let Some(record) = response.results.first() else {
            info!("VIN {} not found in registry", vin);
            return VinDecodeResult::failure(vin, NOT_FOUND_MESSAGE, ErrorCode::VinNotFound);
        };

        let mut result = map_record(&vin, record);
        let upstream_code = upstream_error_code(record);
        let upstream_text = aliases::first_value(record, aliases::ERROR_TEXT);

        if result.make.is_none() && result.model.is_none() && result.year.is_none() {
            // A clean code ("0") still carries text; it only counts next to a real code.
            let (message, code) = match upstream_code {
                Some(code) => (
                    upstream_text.unwrap_or_else(|| NO_DATA_MESSAGE.to_string()),
                    ErrorCode::from(code),
                ),
                None => (NO_DATA_MESSAGE.to_string(), ErrorCode::NoData),
            };
            info!("VIN {} decoded without usable data ({})", vin, code);
            return VinDecodeResult::failure(vin, message, code);
        }

        if upstream_code.is_some() {
            if let Some(text) = upstream_text {
                result.warnings.push(format!("Registry reported: {}", text));
            }
        }
        if check_digit::check_digit_valid(&vin) == Some(false) {
            result
                .warnings
                .push("VIN check digit does not match".to_string());
        }

        self.attach_canadian_trims(&mut result).await;

        self.cache.insert(vin.clone(), result.clone()).await;
        info!(
            "Decoded VIN {}: {:?} {:?} {:?}",
            vin, result.year, result.make, result.model
        );
        result
    }

    async fn attach_canadian_trims(&self, result: &mut VinDecodeResult) {
        let Some(make) = result.make.clone() else {
            return;
        };

        let mut trims: BTreeSet<String> = self.trims.resolve(&make).into_iter().collect();

        let lookup = match (result.year, result.model.clone()) {
            (Some(year), Some(model)) => {
                Some(self.registry.canadian_specs(year, &make, &model).await)
            }
            _ => None,
        };
        match lookup {
            Some(Ok(Some(specs))) => trims.extend(specs.trim_names()),
            Some(Err(e)) => {
                warn!("Canadian spec lookup failed for {}: {}", result.vin, e);
                result
                    .warnings
                    .push(format!("Canadian spec lookup failed: {}", e));
            }
            _ => {}
        }

        if !trims.is_empty() {
            result.canadian_trims = trims.into_iter().collect();
            result.has_canadian_data = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(
            normalize_vin("  1hgcm82633a004352 \n"),
            Some("1HGCM82633A004352".to_string())
        );
        assert_eq!(normalize_vin("1HGCM8263"), None);
        assert_eq!(normalize_vin("   1HGCM8263   "), None);
        assert_eq!(normalize_vin(""), None);
    }

    #[test]
    fn map_record_normalizes_fields() {
        let record = json!({
            "Make": "HONDA",
            "Model": "Accord",
            "ModelYear": "2003",
            "Trim": "Not Applicable",
            "Series2": "EX",
            "Doors": "4",
            "EngineCylinders": "4",
            "DisplacementL": "2.4",
            "PlantCountry": "UNITED STATES (USA)"
        });
        let r = map_record("1HGCM82633A004352", record.as_object().unwrap());
        assert_eq!(r.make.as_deref(), Some("Honda"));
        assert_eq!(r.model.as_deref(), Some("Accord"));
        assert_eq!(r.year, Some(2003));
        assert_eq!(r.trim, None);
        assert_eq!(r.series.as_deref(), Some("EX"));
        assert_eq!(r.door_count, Some(4));
        assert_eq!(r.engine_cylinder_count, Some(4));
        assert_eq!(r.engine_displacement.as_deref(), Some("2.4"));
        assert!(r.error.is_none());
    }

    #[test]
    fn clean_decode_code_is_not_an_upstream_error() {
        let clean = json!({"ErrorCode": "0"});
        assert_eq!(upstream_error_code(clean.as_object().unwrap()), None);
        let dirty = json!({"ErrorCode": "11"});
        assert_eq!(
            upstream_error_code(dirty.as_object().unwrap()),
            Some("11".to_string())
        );
    }
}
