use super::detectors;
use crate::core::types::ExtractedListing;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

/// schema.org types that describe a vehicle for sale.
const VEHICLE_TYPES: &[&str] = &["Car", "Vehicle", "MotorVehicle", "Product"];

/// Fields found in JSON-LD blocks, before plausibility checks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StructuredVehicle {
    pub listing: ExtractedListing,
    /// `@type` of every block that contributed at least one field.
    pub types: Vec<String>,
}

/// Collect vehicle fields from every `application/ld+json` script.
/// Earlier blocks win; later blocks only fill what is still absent.
pub fn structured_vehicle(document: &Html) -> StructuredVehicle {
    let mut out = StructuredVehicle::default();
    let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
        return out;
    };

    for script in document.select(&selector) {
        let json_text = script.inner_html();
        if json_text.trim().is_empty() {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(&json_text) {
            collect(&value, &mut out);
        }
    }
    out
}

fn collect(value: &Value, out: &mut StructuredVehicle) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                collect(graph, out);
            }
            if let Some(type_name) = vehicle_type(map) {
                let before = out.listing.field_count();
                fill_from_block(map, &mut out.listing);
                if out.listing.field_count() > before && !out.types.contains(&type_name) {
                    out.types.push(type_name);
                }
            }
        }
        _ => {}
    }
}

fn vehicle_type(map: &Map<String, Value>) -> Option<String> {
    let types: Vec<&str> = match map.get("@type") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(|v| v.as_str()).collect(),
        _ => return None,
    };
    VEHICLE_TYPES
        .iter()
        .find(|t| types.contains(t))
        .map(|t| t.to_string())
}

fn fill_from_block(map: &Map<String, Value>, listing: &mut ExtractedListing) {
    if listing.vin.is_none() {
        listing.vin = json_ld_string(map.get("vehicleIdentificationNumber"))
            .and_then(|v| detectors::detect_vin(&v, "").value);
    }
    if listing.make.is_none() {
        listing.make = json_ld_name(map.get("brand")).or_else(|| json_ld_name(map.get("manufacturer")));
    }
    if listing.model.is_none() {
        listing.model = json_ld_name(map.get("model"));
    }
    if listing.year.is_none() {
        listing.year = ["vehicleModelDate", "modelDate", "productionDate", "releaseDate"]
            .iter()
            .find_map(|key| json_ld_string(map.get(*key)).and_then(|d| leading_year(&d)));
    }
    if listing.kilometers.is_none() {
        listing.kilometers = json_ld_kilometers(map.get("mileageFromOdometer"));
    }
    if listing.price.is_none() {
        listing.price = json_ld_price(map.get("offers"));
    }
    if listing.color.is_none() {
        listing.color = json_ld_string(map.get("color"))
            .and_then(|c| detectors::detect_color(&c).value);
    }
    if listing.stock_number.is_none() {
        listing.stock_number = json_ld_string(map.get("sku"))
            .filter(|s| s.chars().any(|c| c.is_ascii_digit()));
    }
}

fn json_ld_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Array(items)) => items.iter().find_map(|item| json_ld_string(Some(item))),
        _ => None,
    }
}

/// A plain string, or an object carrying `name` (`{"@type": "Brand", "name": "Honda"}`).
fn json_ld_name(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Object(map)) => json_ld_string(map.get("name")),
        other => json_ld_string(other),
    }
}

fn leading_year(date: &str) -> Option<u16> {
    let head: String = date.chars().take(4).collect();
    if head.len() == 4 && head.chars().all(|c| c.is_ascii_digit()) {
        head.parse().ok()
    } else {
        None
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Odometer in kilometres. Values in miles (`SMI`) are ignored; a missing
/// unit is read as kilometres.
fn json_ld_kilometers(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Object(map) => {
            let unit = json_ld_string(map.get("unitCode"))
                .or_else(|| json_ld_string(map.get("unitText")))
                .map(|u| u.to_ascii_uppercase());
            if let Some(unit) = unit {
                if unit == "SMI" || unit.starts_with("MI") {
                    return None;
                }
            }
            let amount = parse_amount(&json_ld_string(map.get("value"))?)?;
            Some(amount.round() as u64)
        }
        other => {
            let text = json_ld_string(Some(other))?;
            if text.to_ascii_lowercase().contains("mi") {
                return None;
            }
            parse_amount(&text).map(|v| v.round() as u64)
        }
    }
}

fn json_ld_price(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Array(items) => items.iter().find_map(|item| json_ld_price(Some(item))),
        Value::Object(map) => json_ld_string(map.get("price"))
            .or_else(|| json_ld_string(map.get("lowPrice")))
            .and_then(|p| parse_amount(&p))
            .map(|p| p.round() as u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> StructuredVehicle {
        structured_vehicle(&Html::parse_document(html))
    }

    #[test]
    fn reads_car_block() {
        let sv = parse(
            r#"<script type="application/ld+json">{
                "@context": "https://schema.org",
                "@type": "Car",
                "vehicleIdentificationNumber": "2t1burhe0jc043821",
                "brand": {"@type": "Brand", "name": "Toyota"},
                "model": "Corolla",
                "vehicleModelDate": "2018",
                "mileageFromOdometer": {"@type": "QuantitativeValue", "value": "63400", "unitCode": "KMT"},
                "offers": {"@type": "Offer", "price": "18995.00", "priceCurrency": "CAD"},
                "color": "Classic Silver Metallic",
                "sku": "T2291"
            }</script>"#,
        );
        let l = &sv.listing;
        assert_eq!(l.vin.as_deref(), Some("2T1BURHE0JC043821"));
        assert_eq!(l.make.as_deref(), Some("Toyota"));
        assert_eq!(l.model.as_deref(), Some("Corolla"));
        assert_eq!(l.year, Some(2018));
        assert_eq!(l.kilometers, Some(63_400));
        assert_eq!(l.price, Some(18_995));
        assert_eq!(l.color.as_deref(), Some("Silver"));
        assert_eq!(l.stock_number.as_deref(), Some("T2291"));
        assert_eq!(sv.types, vec!["Car"]);
    }

    #[test]
    fn walks_graph_and_skips_unrelated_types() {
        let sv = parse(
            r#"<script type="application/ld+json">{
                "@graph": [
                    {"@type": "Organization", "name": "Maple Motors"},
                    {"@type": ["Product", "Car"], "brand": "Mazda", "offers": [{"price": 27450}]}
                ]
            }</script>"#,
        );
        assert_eq!(sv.listing.make.as_deref(), Some("Mazda"));
        assert_eq!(sv.listing.price, Some(27_450));
        assert_eq!(sv.types, vec!["Car"]);
    }

    #[test]
    fn ignores_miles_and_broken_json() {
        let sv = parse(
            r#"<script type="application/ld+json">{not json</script>
               <script type="application/ld+json">{"@type": "Vehicle",
                 "mileageFromOdometer": {"value": 30000, "unitCode": "SMI"}}</script>"#,
        );
        assert_eq!(sv.listing.kilometers, None);
        assert!(sv.types.is_empty());
    }
}
