/// Report cache keyed by the version of the historical stream.
use crate::domain::AssessmentReport;
use std::sync::Arc;

/// Identity of the stored stream at the time a report was computed.
///
/// Any append raises `last_id`, which invalidates the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamVersion {
    pub source: String,
    pub last_id: i64,
}

#[derive(Debug, Default)]
pub struct ReportCache {
    entry: Option<(StreamVersion, Arc<AssessmentReport>)>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached report if it was computed for exactly this version
    pub fn lookup(&self, version: &StreamVersion) -> Option<Arc<AssessmentReport>> {
        self.entry
            .as_ref()
            .filter(|(cached, _)| cached == version)
            .map(|(_, report)| Arc::clone(report))
    }

    pub fn store(
        &mut self,
        version: StreamVersion,
        report: AssessmentReport,
    ) -> Arc<AssessmentReport> {
        let report = Arc::new(report);
        self.entry = Some((version, Arc::clone(&report)));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PatternFlags;
    use chrono::Utc;

    fn version(last_id: i64) -> StreamVersion {
        StreamVersion {
            source: "aircraft_states".to_string(),
            last_id,
        }
    }

    fn report() -> AssessmentReport {
        AssessmentReport {
            generated_at: Utc::now(),
            aircraft: Vec::new(),
            zones: Vec::new(),
            pattern_flags: PatternFlags::default(),
        }
    }

    #[test]
    fn test_empty_cache_misses() {
        assert!(ReportCache::new().lookup(&version(1)).is_none());
    }

    #[test]
    fn test_same_version_reuses_report() {
        let mut cache = ReportCache::new();
        let stored = cache.store(version(10), report());
        let hit = cache.lookup(&version(10)).unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));
    }

    #[test]
    fn test_append_invalidates() {
        let mut cache = ReportCache::new();
        cache.store(version(10), report());
        assert!(cache.lookup(&version(12)).is_none());
    }

    #[test]
    fn test_different_source_misses() {
        let mut cache = ReportCache::new();
        cache.store(version(10), report());
        let mut other = version(10);
        other.source = "replay".to_string();
        assert!(cache.lookup(&other).is_none());
    }
}
