/// Utility functions
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Kilometres per degree, applied to latitude and longitude alike
pub const KM_PER_DEGREE: f64 = 111.0;

/// Extract number from JSON value
pub fn num(v: &Value) -> Option<f64> {
    if let Some(x) = v.as_f64() {
        return Some(x);
    }
    if let Some(s) = v.as_str() {
        return s.parse::<f64>().ok();
    }
    None
}

/// Extract a string from JSON value
pub fn text(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.to_string())
}

/// Interpret a JSON number as unix seconds
pub fn unix_time(v: &Value) -> Option<DateTime<Utc>> {
    let secs = v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp(secs, 0)
}

/// Flat-Earth distance: both axes scaled by 111 km/degree, no cos(latitude)
/// correction on longitude.
pub fn flat_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat_km = (lat2 - lat1) * KM_PER_DEGREE;
    let dlon_km = (lon2 - lon1) * KM_PER_DEGREE;
    (dlat_km.powi(2) + dlon_km.powi(2)).sqrt()
}
