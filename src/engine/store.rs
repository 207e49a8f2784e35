/// Working set of validated aircraft states for one analysis cycle.
use crate::domain::{AircraftState, StateRecord};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;

/// Validated states in input order, plus a count of rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct StateRecordStore {
    states: Vec<AircraftState>,
    dropped: usize,
}

impl StateRecordStore {
    /// Ingest raw rows, skipping any that lack an identifier or coordinates
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = StateRecord>,
    {
        let mut states = Vec::new();
        let mut dropped = 0;
        for record in records {
            match AircraftState::try_from(record) {
                Ok(state) => states.push(state),
                Err(reason) => {
                    warn!("skipping malformed record: {}", reason);
                    dropped += 1;
                }
            }
        }
        Self { states, dropped }
    }

    pub fn states(&self) -> &[AircraftState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Rows rejected at ingestion
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn latest_observed_at(&self) -> Option<DateTime<Utc>> {
        self.states.iter().map(|s| s.observed_at).max()
    }

    /// Observations at or after `since`, grouped per icao24 in input order
    pub fn tracks_since(&self, since: DateTime<Utc>) -> HashMap<&str, Vec<&AircraftState>> {
        let mut tracks: HashMap<&str, Vec<&AircraftState>> = HashMap::new();
        for state in self.states.iter().filter(|s| s.observed_at >= since) {
            tracks.entry(state.icao24.as_str()).or_default().push(state);
        }
        tracks
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    pub(crate) fn raw(icao24: &str, lat: Option<f64>, lon: Option<f64>, secs: i64) -> StateRecord {
        StateRecord {
            icao24: icao24.to_string(),
            callsign: None,
            origin_country: None,
            longitude: lon,
            latitude: lat,
            altitude_m: None,
            on_ground: false,
            velocity_mps: None,
            heading_deg: None,
            vertical_rate_mps: None,
            observed_at: at(secs),
        }
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let store = StateRecordStore::from_records(vec![
            raw("a1", Some(1.0), Some(2.0), 0),
            raw("a2", None, Some(2.0), 0),
            raw("a3", Some(1.0), None, 0),
            raw("", Some(1.0), Some(2.0), 0),
            raw("a4", Some(1.0), Some(2.0), 5),
        ]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.dropped(), 3);
        assert_eq!(store.states()[0].icao24, "a1");
        assert_eq!(store.states()[1].icao24, "a4");
    }

    #[test]
    fn test_empty_store() {
        let store = StateRecordStore::from_records(Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.latest_observed_at(), None);
    }

    #[test]
    fn test_latest_observed_at() {
        let store = StateRecordStore::from_records(vec![
            raw("a1", Some(1.0), Some(2.0), 30),
            raw("a2", Some(1.0), Some(2.0), 10),
        ]);
        assert_eq!(store.latest_observed_at(), Some(at(30)));
    }

    #[test]
    fn test_tracks_since_groups_by_aircraft() {
        let store = StateRecordStore::from_records(vec![
            raw("a1", Some(1.0), Some(2.0), 0),
            raw("a1", Some(1.1), Some(2.0), 60),
            raw("a2", Some(5.0), Some(5.0), 60),
            raw("a1", Some(1.2), Some(2.0), 120),
        ]);
        let tracks = store.tracks_since(at(60));
        assert_eq!(tracks["a1"].len(), 2);
        assert_eq!(tracks["a1"][0].latitude, 1.1);
        assert_eq!(tracks["a2"].len(), 1);
    }
}
