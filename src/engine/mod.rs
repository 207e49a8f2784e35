/// Threat assessment engine: classification, zone analytics and pattern flags
pub mod cache;
pub mod classifier;
pub mod patterns;
pub mod report;
pub mod store;
pub mod summary;
pub mod window;
pub mod zones;

use crate::config::EngineConfig;
use crate::domain::{
    AircraftState, AssessmentReport, ClassifiedAircraft, StateRecord, ThreatZone,
};
use crate::errors::ConfigError;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

pub use cache::{ReportCache, StreamVersion};
pub use classifier::MilitaryClassifier;
pub use patterns::PatternDetector;
pub use store::StateRecordStore;
pub use window::select_window;
pub use zones::ZoneEngine;

/// Pure per-cycle pipeline built from one validated configuration
#[derive(Debug, Clone)]
pub struct ThreatEngine {
    classifier: MilitaryClassifier,
    zones: ZoneEngine,
    detector: PatternDetector,
    active_window: Duration,
    loiter_lookback: Duration,
}

impl ThreatEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: MilitaryClassifier::new(&config.patterns),
            detector: PatternDetector::new(
                config.loiter_lookback,
                config.loiter_threshold_km,
                config.cluster_radius_km,
            ),
            zones: ZoneEngine::new(config.zones),
            active_window: config.active_window,
            loiter_lookback: config.loiter_lookback,
        })
    }

    pub fn zones(&self) -> &[ThreatZone] {
        self.zones.zones()
    }

    pub fn active_window(&self) -> Duration {
        self.active_window
    }

    /// How far back the history passed to [`ThreatEngine::assess`] must reach
    pub fn loiter_lookback(&self) -> Duration {
        self.loiter_lookback
    }

    /// Classify and annotate the windowed aircraft with zone memberships
    pub fn classify(&self, window: &[AircraftState]) -> Vec<ClassifiedAircraft> {
        window
            .iter()
            .map(|state| {
                let classification = self.classifier.classify(state.callsign.as_deref());
                let mut aircraft = ClassifiedAircraft::new(state, classification);
                aircraft.zone_memberships = self.zones.memberships(state.latitude, state.longitude);
                aircraft
            })
            .collect()
    }

    /// Assess an already selected window against the longer history
    pub fn assess(
        &self,
        window: &[AircraftState],
        history: &StateRecordStore,
        generated_at: DateTime<Utc>,
    ) -> AssessmentReport {
        let aircraft = self.classify(window);
        let zones = self.zones.assess(&aircraft);
        let flags = self.detector.detect(window, history, self.zones.zones());

        debug!(
            "cycle: {} aircraft, {} military, {} loitering, {} clustered zones",
            aircraft.len(),
            aircraft.iter().filter(|a| a.is_military).count(),
            flags.loitering_aircraft.len(),
            flags.clustered_zones.len()
        );

        report::assemble(generated_at, aircraft, zones, flags)
    }

    /// Full cycle over raw stored rows: ingest, select the window, assess
    pub fn run_cycle(
        &self,
        records: Vec<StateRecord>,
        generated_at: DateTime<Utc>,
    ) -> AssessmentReport {
        let history = StateRecordStore::from_records(records);
        debug!(
            "ingested {} records, dropped {} malformed",
            history.len(),
            history.dropped()
        );
        let window = select_window(history.states(), self.active_window);
        self.assess(&window, &history, generated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bounds, ThreatLevel};
    use crate::engine::store::tests::{at, raw};

    fn zone(name: &str, bounds: Bounds) -> ThreatZone {
        ThreatZone {
            name: name.to_string(),
            center_lat: (bounds.lat_min + bounds.lat_max) / 2.0,
            center_lon: (bounds.lon_min + bounds.lon_max) / 2.0,
            bounds,
            description: String::new(),
        }
    }

    fn engine(zones: Vec<ThreatZone>) -> ThreatEngine {
        ThreatEngine::new(EngineConfig {
            zones,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    fn with_callsign(mut record: StateRecord, callsign: &str) -> StateRecord {
        record.callsign = Some(callsign.to_string());
        record
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.patterns.clear();
        assert!(ThreatEngine::new(config).is_err());
    }

    #[test]
    fn test_six_military_in_zone_is_high() {
        let box_ = Bounds {
            lat_min: 20.0,
            lon_min: 110.0,
            lat_max: 30.0,
            lon_max: 125.0,
        };
        let engine = engine(vec![zone("Strait", box_)]);

        let mut records = Vec::new();
        for i in 0..25 {
            let icao = format!("ac{:02}", i);
            let lat = 21.0 + (i as f64) * 0.3;
            let mut r = raw(&icao, Some(lat), Some(112.0 + i as f64 * 0.4), 60);
            r.callsign = Some(format!("CIV{}", i));
            records.push(r);
        }
        // military aircraft at positions 3, 7, 11, 15, 19, 23
        for (n, idx) in [3usize, 7, 11, 15, 19, 23].iter().enumerate() {
            records[*idx] = with_callsign(records[*idx].clone(), &format!("RCH{}", n + 1));
        }

        let report = engine.run_cycle(records, at(61));
        assert_eq!(report.aircraft.len(), 25);
        let z = report.zone("Strait").unwrap();
        assert_eq!(z.total_aircraft_in_zone, 25);
        assert_eq!(z.military_aircraft_in_zone, 6);
        assert_eq!(z.threat_level, ThreatLevel::High);
        let callsigns: Vec<&str> = z
            .military_detail
            .iter()
            .map(|c| c.callsign.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(callsigns, vec!["RCH1", "RCH2", "RCH3", "RCH4", "RCH5", "RCH6"]);
        assert!(z
            .military_detail
            .iter()
            .all(|c| c.country_group.as_deref() == Some("US")));
    }

    #[test]
    fn test_empty_stream_yields_normal_report() {
        let engine = engine(EngineConfig::default().zones);
        let report = engine.run_cycle(Vec::new(), at(0));
        assert!(report.aircraft.is_empty());
        assert_eq!(report.zones.len(), engine.zones().len());
        assert!(report
            .zones
            .iter()
            .all(|z| z.threat_level == ThreatLevel::Normal));
        assert!(report.pattern_flags.loitering_aircraft.is_empty());
        assert!(report.pattern_flags.clustered_zones.is_empty());
    }

    #[test]
    fn test_malformed_rows_never_reach_report() {
        let engine = engine(EngineConfig::default().zones);
        let report = engine.run_cycle(
            vec![
                raw("good", Some(24.0), Some(119.5), 0),
                raw("nolat", None, Some(119.5), 0),
            ],
            at(0),
        );
        assert_eq!(report.aircraft.len(), 1);
        assert_eq!(report.aircraft[0].icao24, "good");
        assert_eq!(report.aircraft[0].zone_memberships, vec!["Taiwan Strait"]);
    }

    #[test]
    fn test_loitering_and_clustering_flags() {
        let box_ = Bounds {
            lat_min: 50.0,
            lon_min: 10.0,
            lat_max: 52.0,
            lon_max: 12.0,
        };
        let engine = engine(vec![zone("Box", box_)]);
        let records = vec![
            raw("orbit", Some(51.0), Some(11.0), 0),
            raw("orbit", Some(51.01), Some(11.0), 600),
            raw("orbit", Some(51.0), Some(11.01), 1200),
            raw("pass1", Some(51.2), Some(11.1), 1200),
            raw("pass2", Some(50.8), Some(10.9), 1190),
        ];
        let report = engine.run_cycle(records, at(1200));

        assert_eq!(report.aircraft.len(), 3);
        assert!(report.pattern_flags.loitering_aircraft.contains("orbit"));
        assert_eq!(report.pattern_flags.loitering_aircraft.len(), 1);
        assert_eq!(report.pattern_flags.clustered_zones, vec!["Box"]);
        assert_eq!(report.zone("Box").unwrap().threat_level, ThreatLevel::Normal);
    }

    #[test]
    fn test_report_serializes_with_external_field_names() {
        let engine = engine(EngineConfig::default().zones);
        let report = engine.run_cycle(vec![raw("abc", Some(24.0), Some(119.5), 0)], at(0));
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["generatedAt"].is_string());
        assert_eq!(json["aircraft"][0]["zoneMemberships"][0], "Taiwan Strait");
        assert_eq!(json["zones"][0]["name"], "Taiwan Strait");
        assert_eq!(json["zones"][0]["totalAircraft"], 1);
        assert_eq!(json["zones"][0]["threatLevel"], "NORMAL");
        assert!(json["patternFlags"]["loiteringIcao24s"].is_array());
    }

    #[test]
    fn test_summary_over_classified_window() {
        let engine = engine(EngineConfig::default().zones);
        let mut a = raw("a", Some(1.0), Some(1.0), 0);
        a.origin_country = Some("Germany".to_string());
        let mut b = with_callsign(raw("b", Some(1.0), Some(1.0), 5), "GAF611");
        b.origin_country = Some("Germany".to_string());
        let mut c = raw("c", Some(1.0), Some(1.0), 10);
        c.origin_country = Some("Poland".to_string());
        let report = engine.run_cycle(vec![a, b, c], at(10));

        let summary = summary::summarize(&report.aircraft, summary::DEFAULT_TOP_COUNTRIES);
        assert_eq!(summary.total_aircraft, 3);
        assert_eq!(summary.military_aircraft, 1);
        assert_eq!(summary.countries, 2);
        assert_eq!(summary.top_countries[0].country, "Germany");
        assert_eq!(summary.last_updated, Some(at(10)));
    }
}
