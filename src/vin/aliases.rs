//! Upstream key aliases per logical field.
//!
//! The registry has shipped the same field under several names across
//! response versions. Each list is probed in order; the first key holding a
//! usable value wins.

use serde_json::{Map, Value};

pub const YEAR: &[&str] = &["ModelYear", "Model_Year", "Year", "model_year"];
pub const MAKE: &[&str] = &["Make", "MakeName", "Make_Name", "make"];
pub const MODEL: &[&str] = &["Model", "ModelName", "Model_Name", "model"];
pub const TRIM: &[&str] = &["Trim", "Trim2", "trim"];
pub const SERIES: &[&str] = &["Series", "Series2", "series"];
pub const BODY_CLASS: &[&str] = &["BodyClass", "Body_Class", "bodyClass"];
pub const VEHICLE_TYPE: &[&str] = &["VehicleType", "Vehicle_Type", "vehicleType"];
pub const DOOR_COUNT: &[&str] = &["Doors", "DoorCount", "Door_Count"];
pub const ENGINE_DESCRIPTION: &[&str] = &[
    "EngineModel",
    "Engine_Model",
    "EngineConfiguration",
    "Engine_Configuration",
];
pub const ENGINE_CYLINDERS: &[&str] = &["EngineCylinders", "Engine_Cylinders", "Cylinders"];
pub const ENGINE_DISPLACEMENT: &[&str] = &["DisplacementL", "Displacement_L", "EngineDisplacement"];
pub const FUEL_TYPE: &[&str] = &["FuelTypePrimary", "Fuel_Type_Primary", "FuelType"];
pub const DRIVE_TYPE: &[&str] = &["DriveType", "Drive_Type"];
pub const TRANSMISSION_STYLE: &[&str] = &["TransmissionStyle", "Transmission_Style"];
pub const MANUFACTURER: &[&str] = &["Manufacturer", "ManufacturerName", "Manufacturer_Name"];
pub const PLANT_COUNTRY: &[&str] = &["PlantCountry", "Plant_Country"];
pub const PLANT_STATE: &[&str] = &["PlantState", "Plant_State"];
pub const PLANT_CITY: &[&str] = &["PlantCity", "Plant_City"];
pub const ERROR_TEXT: &[&str] = &["ErrorText", "Error_Text"];
pub const ERROR_CODE: &[&str] = &["ErrorCode", "Error_Code"];

/// Placeholder values the registry uses for "no data".
const EMPTY_MARKERS: &[&str] = &["not applicable", "n/a", "na", "null", "none", "unknown"];

/// Normalize one upstream value: trimmed text, or `None` for blanks and
/// placeholder markers. Numbers are rendered as text.
pub fn clean_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    let lower = text.to_ascii_lowercase();
    if EMPTY_MARKERS.contains(&lower.as_str()) {
        return None;
    }
    Some(text)
}

/// First usable value among `aliases`.
pub fn first_value(record: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(clean_value)
}

pub fn first_number<T: std::str::FromStr>(
    record: &Map<String, Value>,
    aliases: &[&str],
) -> Option<T> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .filter_map(clean_value)
        .find_map(|v| v.parse::<T>().ok())
}

/// `"HONDA"` → `"Honda"`, `"civic"` → `"Civic"`.
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
