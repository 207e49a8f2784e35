/// Composition of one cycle's results into a report.
use crate::domain::{AssessmentReport, ClassifiedAircraft, PatternFlags, ZoneAssessment};
use chrono::{DateTime, Utc};

pub fn assemble(
    generated_at: DateTime<Utc>,
    aircraft: Vec<ClassifiedAircraft>,
    zones: Vec<ZoneAssessment>,
    pattern_flags: PatternFlags,
) -> AssessmentReport {
    AssessmentReport {
        generated_at,
        aircraft,
        zones,
        pattern_flags,
    }
}
