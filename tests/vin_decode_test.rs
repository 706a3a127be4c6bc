use async_trait::async_trait;
use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vehicle_scout::catalog::TrimResolver;
use vehicle_scout::vin::{
    NhtsaRegistry, RegistryResponse, SpecsResponse, VinCache, VinDecoder, VinRegistry,
    NOT_FOUND_MESSAGE, NO_DATA_MESSAGE,
};
use vehicle_scout::{ErrorCode, ScoutError};

const ACCORD_VIN: &str = "1HGCM82633A004352";

/// Scripted registry that counts decode calls.
#[derive(Default)]
struct FakeRegistry {
    decode_calls: AtomicUsize,
    spec_calls: AtomicUsize,
    /// `None` simulates a transport failure.
    response: Mutex<Option<Value>>,
    specs: Option<Result<Value, u16>>,
}

impl FakeRegistry {
    fn returning(body: Value) -> Self {
        Self {
            response: Mutex::new(Some(body)),
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self::default()
    }

    fn with_specs(mut self, specs: Result<Value, u16>) -> Self {
        self.specs = Some(specs);
        self
    }

    fn set_response(&self, body: Value) {
        *self.response.lock().unwrap() = Some(body);
    }

    fn calls(&self) -> usize {
        self.decode_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VinRegistry for FakeRegistry {
    fn name(&self) -> &str {
        "fake"
    }

    async fn decode(&self, _vin: &str) -> Result<RegistryResponse, ScoutError> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        let body = self.response.lock().unwrap().clone();
        match body {
            Some(body) => Ok(serde_json::from_value(body).unwrap()),
            None => Err(ScoutError::Status {
                endpoint: "fake".into(),
                status: 503,
                body: "registry down".into(),
            }),
        }
    }

    async fn canadian_specs(
        &self,
        _year: u16,
        _make: &str,
        _model: &str,
    ) -> Result<Option<SpecsResponse>, ScoutError> {
        self.spec_calls.fetch_add(1, Ordering::SeqCst);
        match &self.specs {
            None => Ok(None),
            Some(Ok(body)) => Ok(Some(serde_json::from_value(body.clone()).unwrap())),
            Some(Err(status)) => Err(ScoutError::Status {
                endpoint: "specs".into(),
                status: *status,
                body: String::new(),
            }),
        }
    }
}

fn decoder(registry: Arc<FakeRegistry>) -> VinDecoder {
    VinDecoder::new(registry, Arc::new(TrimResolver::default()), VinCache::unbounded())
}

fn accord() -> Value {
    json!({
        "Count": 1,
        "Results": [{
            "Make": "HONDA",
            "Model": "Accord",
            "ModelYear": "2003",
            "BodyClass": "Coupe",
            "ErrorCode": "0",
            "ErrorText": "0 - VIN decoded clean. Check Digit (9th position) is correct"
        }]
    })
}

#[tokio::test]
async fn short_vin_is_rejected_without_network() {
    let registry = Arc::new(FakeRegistry::returning(accord()));
    let d = decoder(registry.clone());

    let r = d.decode_vin(" 1HGCM8263 ").await;
    assert_eq!(r.error_code, Some(ErrorCode::InvalidVin));
    assert_eq!(r.vin, " 1HGCM8263 ");
    assert!(!r.has_vehicle_fields());
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn successful_decode_is_normalized_and_enriched() {
    let registry = Arc::new(FakeRegistry::returning(accord()));
    let d = decoder(registry.clone());

    let r = d.decode_vin(ACCORD_VIN).await;
    assert!(r.is_success(), "{:?}", r.error);
    assert_eq!(r.make.as_deref(), Some("Honda"));
    assert_eq!(r.model.as_deref(), Some("Accord"));
    assert_eq!(r.year, Some(2003));
    assert_eq!(r.body_class.as_deref(), Some("Coupe"));
    assert!(r.has_canadian_data);
    assert_eq!(r.canadian_trims, TrimResolver::default().resolve("Honda"));
    assert!(r.warnings.is_empty(), "{:?}", r.warnings);
}

#[tokio::test]
async fn cache_is_keyed_by_normalized_vin() {
    let registry = Arc::new(FakeRegistry::returning(accord()));
    let d = decoder(registry.clone());

    let first = d.decode_vin("  1hgcm82633a004352\n").await;
    let second = d.decode_vin(ACCORD_VIN).await;
    assert_eq!(first, second);
    assert_eq!(first.vin, ACCORD_VIN);
    assert_eq!(registry.calls(), 1);
    assert_eq!(d.cache_stats().await.entries, 1);
}

#[tokio::test]
async fn clearing_the_cache_forces_a_fresh_call() {
    let registry = Arc::new(FakeRegistry::returning(accord()));
    let d = decoder(registry.clone());

    d.decode_vin(ACCORD_VIN).await;
    d.clear_cache().await;
    d.decode_vin(ACCORD_VIN).await;
    assert_eq!(registry.calls(), 2);
}

#[tokio::test]
async fn empty_results_are_not_found_and_not_cached() {
    let registry = Arc::new(FakeRegistry::returning(json!({"Count": 0, "Results": []})));
    let d = decoder(registry.clone());

    let r = d.decode_vin(ACCORD_VIN).await;
    assert_eq!(r.error_code, Some(ErrorCode::VinNotFound));
    assert_eq!(r.error.as_deref(), Some(NOT_FOUND_MESSAGE));

    d.decode_vin(ACCORD_VIN).await;
    assert_eq!(registry.calls(), 2);
}

#[tokio::test]
async fn record_without_make_model_year_is_no_data() {
    let registry = Arc::new(FakeRegistry::returning(json!({
        "Results": [{
            "Make": "",
            "Model": "Not Applicable",
            "ModelYear": null,
            "ErrorCode": "0",
            "ErrorText": "0 - VIN decoded clean. Check Digit (9th position) is correct"
        }]
    })));
    let d = decoder(registry.clone());

    let r = d.decode_vin(ACCORD_VIN).await;
    assert_eq!(r.error_code, Some(ErrorCode::NoData));
    assert_eq!(r.error.as_deref(), Some(NO_DATA_MESSAGE));
    assert!(r.make.is_none() && r.model.is_none());
}

#[tokio::test]
async fn upstream_error_text_and_code_are_carried() {
    let registry = Arc::new(FakeRegistry::returning(json!({
        "Results": [{"ErrorCode": "11", "ErrorText": "11 - Incorrect Model Year, decoded data may not be accurate"}]
    })));
    let d = decoder(registry.clone());

    let r = d.decode_vin(ACCORD_VIN).await;
    assert_eq!(r.error_code, Some(ErrorCode::Upstream("11".into())));
    assert!(r.error.unwrap().starts_with("11 - Incorrect Model Year"));
}

#[tokio::test]
async fn registry_failure_is_api_error_and_recovers() {
    let registry = Arc::new(FakeRegistry::failing());
    let d = decoder(registry.clone());

    let r = d.decode_vin(ACCORD_VIN).await;
    assert_eq!(r.error_code, Some(ErrorCode::ApiError));
    assert!(r.error.unwrap().contains("503"));

    registry.set_response(accord());
    let r = d.decode_vin(ACCORD_VIN).await;
    assert!(r.is_success());
    assert_eq!(registry.calls(), 2);
}

#[tokio::test]
async fn bad_check_digit_is_a_warning() {
    let registry = Arc::new(FakeRegistry::returning(accord()));
    let d = decoder(registry);

    let r = d.decode_vin("1HGCM82643A004352").await;
    assert!(r.is_success());
    assert!(r.warnings.iter().any(|w| w.contains("check digit")));
}

#[tokio::test]
async fn canadian_specs_merge_into_trims() {
    let registry = Arc::new(FakeRegistry::returning(accord()).with_specs(Ok(json!({
        "Results": [{"Specs": [
            {"Name": "Trim", "Value": "SE Coupe"},
            {"Name": "Series", "Value": "N/A"}
        ]}]
    }))));
    let d = decoder(registry.clone());

    let r = d.decode_vin(ACCORD_VIN).await;
    assert!(r.canadian_trims.contains(&"SE Coupe".to_string()));
    assert!(!r.canadian_trims.contains(&"N/A".to_string()));
    let mut sorted = r.canadian_trims.clone();
    sorted.sort();
    assert_eq!(sorted, r.canadian_trims);
    assert_eq!(registry.spec_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn canadian_specs_failure_keeps_the_decode() {
    let registry = Arc::new(FakeRegistry::returning(accord()).with_specs(Err(500)));
    let d = decoder(registry);

    let r = d.decode_vin(ACCORD_VIN).await;
    assert!(r.is_success());
    assert!(r.has_canadian_data);
    assert!(r.warnings.iter().any(|w| w.contains("Canadian spec lookup failed")));
}

#[tokio::test]
async fn separate_decoders_do_not_share_a_cache() {
    let registry = Arc::new(FakeRegistry::returning(accord()));
    decoder(registry.clone()).decode_vin(ACCORD_VIN).await;
    decoder(registry.clone()).decode_vin(ACCORD_VIN).await;
    assert_eq!(registry.calls(), 2);
}

// --- NhtsaRegistry against a local server ---

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn nhtsa_client_decodes_over_http() {
    let app = Router::new().route(
        "/api/vehicles/DecodeVinValues/{vin}",
        get(|Path(vin): Path<String>| async move {
            Json(json!({
                "Count": 1,
                "Message": "Results returned successfully",
                "Results": [{"VIN": vin, "Make": "TOYOTA", "Model": "Corolla", "ModelYear": "2018", "ErrorCode": "0"}]
            }))
        }),
    );
    let base = spawn(app).await;

    let registry = NhtsaRegistry::with_base_url(
        reqwest::Client::new(),
        format!("{}/api/vehicles/DecodeVinValues", base),
    );
    let d = VinDecoder::new(
        Arc::new(registry),
        Arc::new(TrimResolver::default()),
        VinCache::unbounded(),
    );

    let r = d.decode_vin("2T1BURHE0JC043821").await;
    assert!(r.is_success(), "{:?}", r.error);
    assert_eq!(r.make.as_deref(), Some("Toyota"));
    assert_eq!(r.year, Some(2018));
}

#[tokio::test]
async fn nhtsa_client_maps_server_errors_to_api_error() {
    let app = Router::new().route(
        "/api/vehicles/DecodeVinValues/{vin}",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let base = spawn(app).await;

    let registry = NhtsaRegistry::with_base_url(
        reqwest::Client::new(),
        format!("{}/api/vehicles/DecodeVinValues", base),
    );
    let d = VinDecoder::new(
        Arc::new(registry),
        Arc::new(TrimResolver::default()),
        VinCache::unbounded(),
    );

    let r = d.decode_vin(ACCORD_VIN).await;
    assert_eq!(r.error_code, Some(ErrorCode::ApiError));
    assert!(r.error.unwrap().contains("500"));
    assert_eq!(d.cache_stats().await.entries, 0);
}
