/// Application configuration module
use crate::domain::{Bounds, ThreatZone};
use crate::errors::ConfigError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;

pub const DEFAULT_ACTIVE_WINDOW_SECONDS: i64 = 120;
pub const DEFAULT_LOITER_LOOKBACK_MINUTES: i64 = 30;
pub const DEFAULT_LOITER_THRESHOLD_KM: f64 = 10.0;
/// Radius used when clustering is tested around each zone's center
pub const DEFAULT_ZONE_CLUSTER_RADIUS_KM: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub opensky_url: String,
    pub bind_addr: String,
    pub acquisition: AcquisitionSettings,
    pub engine: EngineConfig,
}

#[derive(Clone, Debug)]
pub struct AcquisitionSettings {
    pub poll_seconds: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
}

/// Ordered prefixes attributed to one nation group
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternGroup {
    pub country_group: String,
    pub prefixes: Vec<String>,
}

/// Immutable engine configuration, validated once before the first cycle
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub zones: Vec<ThreatZone>,
    pub patterns: Vec<PatternGroup>,
    pub active_window: Duration,
    pub loiter_lookback: Duration,
    pub loiter_threshold_km: f64,
    pub cluster_radius_km: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zones: default_zones(),
            patterns: default_patterns(),
            active_window: Duration::seconds(DEFAULT_ACTIVE_WINDOW_SECONDS),
            loiter_lookback: Duration::minutes(DEFAULT_LOITER_LOOKBACK_MINUTES),
            loiter_threshold_km: DEFAULT_LOITER_THRESHOLD_KM,
            cluster_radius_km: DEFAULT_ZONE_CLUSTER_RADIUS_KM,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for zone in &self.zones {
            if zone.name.trim().is_empty() {
                return Err(ConfigError::EmptyZoneName);
            }
            if !names.insert(zone.name.as_str()) {
                return Err(ConfigError::DuplicateZone(zone.name.clone()));
            }
            let b = &zone.bounds;
            let coords = [
                b.lat_min,
                b.lon_min,
                b.lat_max,
                b.lon_max,
                zone.center_lat,
                zone.center_lon,
            ];
            if coords.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::NonFiniteCoordinates(zone.name.clone()));
            }
            if b.lat_min > b.lat_max || b.lon_min > b.lon_max {
                return Err(ConfigError::InvertedBounds(zone.name.clone()));
            }
        }

        if self.patterns.is_empty() {
            return Err(ConfigError::EmptyPatterns);
        }
        for group in &self.patterns {
            if group.prefixes.is_empty() {
                return Err(ConfigError::EmptyGroup(group.country_group.clone()));
            }
            if group.prefixes.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::BlankPrefix(group.country_group.clone()));
            }
        }

        if self.active_window <= Duration::zero() {
            return Err(invalid("ACTIVE_WINDOW_SECONDS", "must be positive"));
        }
        if self.loiter_lookback <= Duration::zero() {
            return Err(invalid("LOITER_LOOKBACK_MINUTES", "must be positive"));
        }
        if !is_positive(self.loiter_threshold_km) {
            return Err(invalid("LOITER_THRESHOLD_KM", "must be positive"));
        }
        if !is_positive(self.cluster_radius_km) {
            return Err(invalid("CLUSTER_RADIUS_KM", "must be positive"));
        }
        Ok(())
    }
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        key,
        reason: reason.to_string(),
    }
}

fn seconds_setting(key: &'static str, secs: i64) -> Result<Duration, ConfigError> {
    Duration::try_seconds(secs).ok_or_else(|| invalid(key, "out of range"))
}

fn minutes_setting(key: &'static str, minutes: i64) -> Result<Duration, ConfigError> {
    Duration::try_minutes(minutes).ok_or_else(|| invalid(key, "out of range"))
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingSetting("DATABASE_URL"))?;

        let opensky_url = env::var("OPENSKY_URL")
            .unwrap_or_else(|_| "https://opensky-network.org/api/states/all".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let acquisition = AcquisitionSettings {
            poll_seconds: env_parse("POLL_EVERY_SECONDS", 60),
            max_retries: env_parse("FETCH_MAX_RETRIES", 3),
            backoff_ms: env_parse("FETCH_BACKOFF_MS", 2000),
        };

        let zones = match env::var("ZONES_FILE") {
            Ok(path) => read_json(&path)?,
            Err(_) => default_zones(),
        };
        let patterns = match env::var("PATTERNS_FILE") {
            Ok(path) => read_json(&path)?,
            Err(_) => default_patterns(),
        };

        let engine = EngineConfig {
            zones,
            patterns,
            active_window: seconds_setting(
                "ACTIVE_WINDOW_SECONDS",
                env_parse("ACTIVE_WINDOW_SECONDS", DEFAULT_ACTIVE_WINDOW_SECONDS),
            )?,
            loiter_lookback: minutes_setting(
                "LOITER_LOOKBACK_MINUTES",
                env_parse("LOITER_LOOKBACK_MINUTES", DEFAULT_LOITER_LOOKBACK_MINUTES),
            )?,
            loiter_threshold_km: env_parse("LOITER_THRESHOLD_KM", DEFAULT_LOITER_THRESHOLD_KM),
            cluster_radius_km: env_parse("CLUSTER_RADIUS_KM", DEFAULT_ZONE_CLUSTER_RADIUS_KM),
        };
        engine.validate()?;

        Ok(Self {
            database_url,
            opensky_url,
            bind_addr,
            acquisition,
            engine,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_json(path, &raw)
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &str, raw: &str) -> Result<T, ConfigError> {
    serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

fn zone(
    name: &str,
    (lat_min, lon_min, lat_max, lon_max): (f64, f64, f64, f64),
    (center_lat, center_lon): (f64, f64),
    description: &str,
) -> ThreatZone {
    ThreatZone {
        name: name.to_string(),
        bounds: Bounds {
            lat_min,
            lon_min,
            lat_max,
            lon_max,
        },
        center_lat,
        center_lon,
        description: description.to_string(),
    }
}

/// Built-in monitored regions
pub fn default_zones() -> Vec<ThreatZone> {
    vec![
        zone(
            "Taiwan Strait",
            (22.0, 117.0, 26.5, 122.5),
            (24.0, 119.5),
            "Strait between mainland China and Taiwan",
        ),
        zone(
            "South China Sea",
            (5.0, 105.0, 22.0, 121.0),
            (13.5, 113.0),
            "Contested maritime region",
        ),
        zone(
            "Korean Peninsula",
            (33.0, 124.0, 43.0, 131.0),
            (38.0, 127.5),
            "DMZ and surrounding airspace",
        ),
        zone(
            "Baltic Sea",
            (53.5, 9.5, 66.0, 30.5),
            (58.5, 20.0),
            "NATO eastern flank and Kaliningrad approaches",
        ),
        zone(
            "Black Sea",
            (40.5, 27.0, 47.0, 42.0),
            (43.5, 34.0),
            "Black Sea basin and Crimea",
        ),
        zone(
            "Eastern Mediterranean",
            (30.0, 25.0, 37.5, 36.5),
            (34.0, 31.0),
            "Levant coast and Cyprus",
        ),
        zone(
            "Persian Gulf",
            (23.5, 47.5, 30.5, 57.0),
            (27.0, 52.0),
            "Gulf and Strait of Hormuz",
        ),
    ]
}

fn group(country_group: &str, prefixes: &[&str]) -> PatternGroup {
    PatternGroup {
        country_group: country_group.to_string(),
        prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
    }
}

/// Built-in callsign prefixes. Order is precedence.
pub fn default_patterns() -> Vec<PatternGroup> {
    vec![
        group(
            "US",
            &[
                "RCH", "REACH", "CNV", "NAVY", "ARMY", "PAT", "SAM", "EVAC", "DUKE", "HOMER",
                "JAKE", "SPAR", "VENUS",
            ],
        ),
        group("UK", &["RRR", "ASCOT", "TARTN", "KITTY", "COMET"]),
        group("NATO", &["NATO", "MMF"]),
        group("FRANCE", &["CTM", "FAF", "COTAM"]),
        group("GERMANY", &["GAF", "GAM"]),
        group("RUSSIA", &["RFF", "RSD", "RA-"]),
        group("CHINA", &["CFC", "PLA"]),
    ]
}
