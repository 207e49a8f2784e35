/// Loitering and clustering heuristics over the flat 111 km/degree approximation
use crate::domain::{AircraftState, ClassifiedAircraft, ClusterCheck, PatternFlags, ThreatZone};
use crate::engine::store::StateRecordStore;
use crate::utils::{flat_distance_km, KM_PER_DEGREE};
use chrono::Duration;
use std::collections::{BTreeSet, HashSet};

/// Fewer observations than this never flag as loitering
pub const MIN_LOITER_OBSERVATIONS: usize = 3;
/// Aircraft needed inside the radius to call it a cluster
pub const MIN_CLUSTER_SIZE: usize = 3;
/// Radius for ad-hoc cluster checks around an arbitrary point
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 50.0;

/// Diagonal of the bounding box around a track, in km
pub fn track_extent_km(track: &[&AircraftState]) -> f64 {
    if track.is_empty() {
        return 0.0;
    }
    let mut lat_min = f64::INFINITY;
    let mut lat_max = f64::NEG_INFINITY;
    let mut lon_min = f64::INFINITY;
    let mut lon_max = f64::NEG_INFINITY;
    for state in track {
        lat_min = lat_min.min(state.latitude);
        lat_max = lat_max.max(state.latitude);
        lon_min = lon_min.min(state.longitude);
        lon_max = lon_max.max(state.longitude);
    }
    let lat_range_km = (lat_max - lat_min) * KM_PER_DEGREE;
    let lon_range_km = (lon_max - lon_min) * KM_PER_DEGREE;
    (lat_range_km.powi(2) + lon_range_km.powi(2)).sqrt()
}

/// Loitering iff at least three distinct observations stay within `threshold_km`
pub fn is_loitering(track: &[&AircraftState], threshold_km: f64) -> bool {
    let distinct: HashSet<_> = track.iter().map(|s| s.observed_at).collect();
    if distinct.len() < MIN_LOITER_OBSERVATIONS {
        return false;
    }
    track_extent_km(track) < threshold_km
}

/// `(lat, lon)` points strictly closer than `radius_km` to the center
pub fn count_within<I>(points: I, center_lat: f64, center_lon: f64, radius_km: f64) -> usize
where
    I: IntoIterator<Item = (f64, f64)>,
{
    points
        .into_iter()
        .filter(|&(lat, lon)| flat_distance_km(lat, lon, center_lat, center_lon) < radius_km)
        .count()
}

pub fn is_clustered<I>(points: I, center_lat: f64, center_lon: f64, radius_km: f64) -> bool
where
    I: IntoIterator<Item = (f64, f64)>,
{
    count_within(points, center_lat, center_lon, radius_km) >= MIN_CLUSTER_SIZE
}

/// Cluster test around any point over already classified aircraft.
///
/// `radius_km` defaults to [`DEFAULT_CLUSTER_RADIUS_KM`].
pub fn check_cluster(
    aircraft: &[ClassifiedAircraft],
    center_lat: f64,
    center_lon: f64,
    radius_km: Option<f64>,
) -> ClusterCheck {
    let radius_km = radius_km.unwrap_or(DEFAULT_CLUSTER_RADIUS_KM);
    let points = aircraft.iter().map(|a| (a.lat, a.lon));
    let aircraft_within = count_within(points, center_lat, center_lon, radius_km);
    ClusterCheck {
        center_lat,
        center_lon,
        radius_km,
        aircraft_within,
        clustered: aircraft_within >= MIN_CLUSTER_SIZE,
    }
}

#[derive(Debug, Clone)]
pub struct PatternDetector {
    lookback: Duration,
    loiter_threshold_km: f64,
    cluster_radius_km: f64,
}

impl PatternDetector {
    pub fn new(lookback: Duration, loiter_threshold_km: f64, cluster_radius_km: f64) -> Self {
        Self {
            lookback,
            loiter_threshold_km,
            cluster_radius_km,
        }
    }

    /// Current aircraft whose lookback history stays within the threshold.
    ///
    /// The lookback period ends at the newest observation in `history`.
    pub fn loitering_aircraft(
        &self,
        window: &[AircraftState],
        history: &StateRecordStore,
    ) -> BTreeSet<String> {
        if window.is_empty() || history.is_empty() {
            return BTreeSet::new();
        }
        let Some(latest) = history.latest_observed_at() else {
            return BTreeSet::new();
        };
        let tracks = history.tracks_since(latest - self.lookback);

        window
            .iter()
            .filter(|a| {
                tracks
                    .get(a.icao24.as_str())
                    .is_some_and(|track| is_loitering(track, self.loiter_threshold_km))
            })
            .map(|a| a.icao24.clone())
            .collect()
    }

    /// Zones whose center has a cluster of current aircraft, in configured order
    pub fn clustered_zones(&self, window: &[AircraftState], zones: &[ThreatZone]) -> Vec<String> {
        zones
            .iter()
            .filter(|z| {
                let points = window.iter().map(|a| (a.latitude, a.longitude));
                is_clustered(points, z.center_lat, z.center_lon, self.cluster_radius_km)
            })
            .map(|z| z.name.clone())
            .collect()
    }

    pub fn detect(
        &self,
        window: &[AircraftState],
        history: &StateRecordStore,
        zones: &[ThreatZone],
    ) -> PatternFlags {
        PatternFlags {
            loitering_aircraft: self.loitering_aircraft(window, history),
            clustered_zones: self.clustered_zones(window, zones),
        }
    }
}
