/// Zone membership and threat tiers.
use crate::domain::{Bounds, ClassifiedAircraft, ThreatLevel, ThreatZone, ZoneAssessment};

const HIGH_MILITARY_COUNT: usize = 5;
const ELEVATED_MILITARY_COUNT: usize = 2;
const MODERATE_TOTAL_COUNT: usize = 20;

/// Membership test tolerant of missing coordinates
pub fn in_zone(lat: Option<f64>, lon: Option<f64>, bounds: &Bounds) -> bool {
    match (lat, lon) {
        (Some(lat), Some(lon)) => bounds.contains(lat, lon),
        _ => false,
    }
}

/// Tier for a zone's counts. Military presence is checked before traffic volume.
pub fn threat_level(military_count: usize, total_count: usize) -> ThreatLevel {
    if military_count >= HIGH_MILITARY_COUNT {
        ThreatLevel::High
    } else if military_count >= ELEVATED_MILITARY_COUNT {
        ThreatLevel::Elevated
    } else if total_count > MODERATE_TOTAL_COUNT {
        ThreatLevel::Moderate
    } else {
        ThreatLevel::Normal
    }
}

#[derive(Debug, Clone)]
pub struct ZoneEngine {
    zones: Vec<ThreatZone>,
}

impl ZoneEngine {
    pub fn new(zones: Vec<ThreatZone>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &[ThreatZone] {
        &self.zones
    }

    /// Names of every zone containing the point, in configured order
    pub fn memberships(&self, lat: f64, lon: f64) -> Vec<String> {
        self.zones
            .iter()
            .filter(|z| in_zone(Some(lat), Some(lon), &z.bounds))
            .map(|z| z.name.clone())
            .collect()
    }

    /// One assessment per configured zone
    pub fn assess(&self, aircraft: &[ClassifiedAircraft]) -> Vec<ZoneAssessment> {
        self.zones
            .iter()
            .map(|zone| assess_zone(zone, aircraft))
            .collect()
    }
}

fn assess_zone(zone: &ThreatZone, aircraft: &[ClassifiedAircraft]) -> ZoneAssessment {
    let inside: Vec<&ClassifiedAircraft> = aircraft
        .iter()
        .filter(|a| in_zone(Some(a.lat), Some(a.lon), &zone.bounds))
        .collect();
    let military_detail: Vec<_> = inside
        .iter()
        .filter(|a| a.is_military)
        .map(|a| a.contact())
        .collect();

    ZoneAssessment {
        zone_name: zone.name.clone(),
        total_aircraft_in_zone: inside.len(),
        military_aircraft_in_zone: military_detail.len(),
        threat_level: threat_level(military_detail.len(), inside.len()),
        military_detail,
    }
}
