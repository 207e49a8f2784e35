/// Domain models for the application
use crate::errors::MalformedRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw state vector row as produced by acquisition and kept in the log.
///
/// Coordinates are optional here; rows missing either one never make it past
/// the window selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StateRecord {
    pub icao24: String,
    pub callsign: Option<String>,
    pub origin_country: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub altitude_m: Option<f64>,
    pub on_ground: bool,
    pub velocity_mps: Option<f64>,
    pub heading_deg: Option<f64>,
    pub vertical_rate_mps: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

/// One validated observation of one aircraft at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftState {
    pub icao24: String,
    pub callsign: Option<String>,
    pub origin_country: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub altitude_m: Option<f64>,
    pub on_ground: bool,
    pub velocity_mps: Option<f64>,
    pub heading_deg: Option<f64>,
    pub vertical_rate_mps: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

impl TryFrom<StateRecord> for AircraftState {
    type Error = MalformedRecord;

    fn try_from(record: StateRecord) -> Result<Self, Self::Error> {
        let icao24 = record.icao24.trim();
        if icao24.is_empty() {
            return Err(MalformedRecord::MissingIcao24);
        }
        let latitude = record
            .latitude
            .filter(|v| v.is_finite())
            .ok_or_else(|| MalformedRecord::MissingLatitude(icao24.to_string()))?;
        let longitude = record
            .longitude
            .filter(|v| v.is_finite())
            .ok_or_else(|| MalformedRecord::MissingLongitude(icao24.to_string()))?;

        Ok(Self {
            icao24: icao24.to_string(),
            callsign: normalize_callsign(record.callsign),
            origin_country: record.origin_country,
            longitude,
            latitude,
            altitude_m: record.altitude_m,
            on_ground: record.on_ground,
            velocity_mps: record.velocity_mps,
            heading_deg: record.heading_deg,
            vertical_rate_mps: record.vertical_rate_mps,
            observed_at: record.observed_at,
        })
    }
}

/// Trim a callsign, mapping blank values to `None`
pub fn normalize_callsign(callsign: Option<String>) -> Option<String> {
    callsign
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Inclusive latitude/longitude rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

impl Bounds {
    /// Inclusive on all four edges. NaN never matches.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.lat_min <= lat && lat <= self.lat_max && self.lon_min <= lon && lon <= self.lon_max
    }
}

/// A named geographic rectangle of monitoring interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatZone {
    pub name: String,
    pub bounds: Bounds,
    pub center_lat: f64,
    pub center_lon: f64,
    #[serde(default)]
    pub description: String,
}

/// Military verdict for one callsign
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub is_military: bool,
    pub military_country_group: Option<String>,
}

impl ClassificationResult {
    pub fn civilian() -> Self {
        Self::default()
    }

    pub fn military(group: impl Into<String>) -> Self {
        Self {
            is_military: true,
            military_country_group: Some(group.into()),
        }
    }
}

/// Zone threat tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatLevel {
    Normal,
    Moderate,
    Elevated,
    High,
}

/// Military aircraft entry shown in a zone's detail list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilitaryContact {
    pub icao24: String,
    pub callsign: Option<String>,
    pub country_group: Option<String>,
    pub altitude: Option<f64>,
    pub velocity: Option<f64>,
}

/// Per-zone result of one analysis cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAssessment {
    #[serde(rename = "name")]
    pub zone_name: String,
    #[serde(rename = "totalAircraft")]
    pub total_aircraft_in_zone: usize,
    #[serde(rename = "militaryAircraft")]
    pub military_aircraft_in_zone: usize,
    pub threat_level: ThreatLevel,
    pub military_detail: Vec<MilitaryContact>,
}

/// Global behavioural flags
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternFlags {
    #[serde(rename = "loiteringIcao24s")]
    pub loitering_aircraft: BTreeSet<String>,
    pub clustered_zones: Vec<String>,
}

/// Windowed aircraft annotated with its classification and zone memberships
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedAircraft {
    pub icao24: String,
    pub callsign: Option<String>,
    pub origin_country: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub altitude: Option<f64>,
    pub velocity: Option<f64>,
    pub heading: Option<f64>,
    pub on_ground: bool,
    pub observed_at: DateTime<Utc>,
    pub is_military: bool,
    pub military_country_group: Option<String>,
    pub zone_memberships: Vec<String>,
}

impl ClassifiedAircraft {
    pub fn new(state: &AircraftState, classification: ClassificationResult) -> Self {
        Self {
            icao24: state.icao24.clone(),
            callsign: state.callsign.clone(),
            origin_country: state.origin_country.clone(),
            lat: state.latitude,
            lon: state.longitude,
            altitude: state.altitude_m,
            velocity: state.velocity_mps,
            heading: state.heading_deg,
            on_ground: state.on_ground,
            observed_at: state.observed_at,
            is_military: classification.is_military,
            military_country_group: classification.military_country_group,
            zone_memberships: Vec::new(),
        }
    }

    pub fn contact(&self) -> MilitaryContact {
        MilitaryContact {
            icao24: self.icao24.clone(),
            callsign: self.callsign.clone(),
            country_group: self.military_country_group.clone(),
            altitude: self.altitude,
            velocity: self.velocity,
        }
    }
}

/// Immutable output of one analysis cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    pub generated_at: DateTime<Utc>,
    pub aircraft: Vec<ClassifiedAircraft>,
    pub zones: Vec<ZoneAssessment>,
    pub pattern_flags: PatternFlags,
}

impl AssessmentReport {
    pub fn zone(&self, name: &str) -> Option<&ZoneAssessment> {
        self.zones.iter().find(|z| z.zone_name == name)
    }
}

/// Ad-hoc density check around an arbitrary point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterCheck {
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_km: f64,
    pub aircraft_within: usize,
    pub clustered: bool,
}

/// Traffic statistics over the current window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSummary {
    pub total_aircraft: usize,
    pub military_aircraft: usize,
    pub countries: usize,
    pub top_countries: Vec<CountryCount>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Statistics over the whole stored log
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub total_records: i64,
    pub unique_aircraft: i64,
    pub first_observed_at: Option<DateTime<Utc>>,
    pub last_observed_at: Option<DateTime<Utc>>,
    pub top_countries: Vec<CountryCount>,
}

/// Health check response
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub now: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lat: Option<f64>, lon: Option<f64>) -> StateRecord {
        StateRecord {
            icao24: "ae1234".to_string(),
            callsign: Some("  RCH123 ".to_string()),
            origin_country: Some("United States".to_string()),
            longitude: lon,
            latitude: lat,
            altitude_m: Some(9000.0),
            on_ground: false,
            velocity_mps: Some(230.0),
            heading_deg: Some(90.0),
            vertical_rate_mps: None,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_record_converts_and_trims_callsign() {
        let state = AircraftState::try_from(record(Some(25.0), Some(120.0))).unwrap();
        assert_eq!(state.callsign.as_deref(), Some("RCH123"));
        assert_eq!(state.latitude, 25.0);
    }

    #[test]
    fn test_missing_latitude_is_malformed() {
        let err = AircraftState::try_from(record(None, Some(120.0))).unwrap_err();
        assert_eq!(err, MalformedRecord::MissingLatitude("ae1234".to_string()));
    }

    #[test]
    fn test_missing_longitude_is_malformed() {
        let err = AircraftState::try_from(record(Some(25.0), None)).unwrap_err();
        assert_eq!(err, MalformedRecord::MissingLongitude("ae1234".to_string()));
    }

    #[test]
    fn test_blank_icao24_is_malformed() {
        let mut r = record(Some(25.0), Some(120.0));
        r.icao24 = "  ".to_string();
        assert_eq!(AircraftState::try_from(r).unwrap_err(), MalformedRecord::MissingIcao24);
    }

    #[test]
    fn test_blank_callsign_becomes_none() {
        assert_eq!(normalize_callsign(Some("   ".to_string())), None);
        assert_eq!(normalize_callsign(None), None);
    }

    #[test]
    fn test_bounds_inclusive_edges() {
        let b = Bounds {
            lat_min: 10.0,
            lon_min: 20.0,
            lat_max: 11.0,
            lon_max: 21.0,
        };
        assert!(b.contains(11.0, 21.0));
        assert!(b.contains(10.0, 20.0));
        assert!(!b.contains(11.0001, 21.0));
        assert!(!b.contains(f64::NAN, 20.5));
    }

    #[test]
    fn test_threat_level_ordering() {
        assert!(ThreatLevel::Normal < ThreatLevel::Moderate);
        assert!(ThreatLevel::Moderate < ThreatLevel::Elevated);
        assert!(ThreatLevel::Elevated < ThreatLevel::High);
    }
}
