/// Callsign based military classification.
use crate::config::PatternGroup;
use crate::domain::ClassificationResult;

/// First-match prefix classifier.
///
/// Rules are kept as one flat list of `(group, prefix)` pairs in configured
/// order; the first prefix the callsign starts with decides the result.
#[derive(Debug, Clone)]
pub struct MilitaryClassifier {
    rules: Vec<(String, String)>,
}

impl MilitaryClassifier {
    pub fn new(groups: &[PatternGroup]) -> Self {
        let rules = groups
            .iter()
            .flat_map(|group| {
                group
                    .prefixes
                    .iter()
                    .map(move |prefix| (group.country_group.clone(), prefix.trim().to_uppercase()))
            })
            .filter(|(_, prefix)| !prefix.is_empty())
            .collect();
        Self { rules }
    }

    #[cfg(test)]
    pub fn rules(&self) -> &[(String, String)] {
        &self.rules
    }

    pub fn classify(&self, callsign: Option<&str>) -> ClassificationResult {
        let normalized = match callsign.map(str::trim) {
            Some(c) if !c.is_empty() => c.to_uppercase(),
            _ => return ClassificationResult::civilian(),
        };

        self.rules
            .iter()
            .find(|(_, prefix)| normalized.starts_with(prefix.as_str()))
            .map(|(group, _)| ClassificationResult::military(group.clone()))
            .unwrap_or_else(ClassificationResult::civilian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_patterns;

    fn group(name: &str, prefixes: &[&str]) -> PatternGroup {
        PatternGroup {
            country_group: name.to_string(),
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_reach_callsign_is_us_military() {
        let classifier = MilitaryClassifier::new(&default_patterns());
        let result = classifier.classify(Some("RCH123"));
        assert!(result.is_military);
        assert_eq!(result.military_country_group.as_deref(), Some("US"));
    }

    #[test]
    fn test_airline_callsign_is_civilian() {
        let classifier = MilitaryClassifier::new(&default_patterns());
        assert_eq!(
            classifier.classify(Some("DAL45")),
            ClassificationResult::civilian()
        );
    }

    #[test]
    fn test_missing_or_blank_callsign_is_civilian() {
        let classifier = MilitaryClassifier::new(&default_patterns());
        assert!(!classifier.classify(None).is_military);
        assert!(!classifier.classify(Some("   ")).is_military);
    }

    #[test]
    fn test_callsign_normalized_before_matching() {
        let classifier = MilitaryClassifier::new(&default_patterns());
        let result = classifier.classify(Some("  rch7 "));
        assert_eq!(result.military_country_group.as_deref(), Some("US"));
    }

    #[test]
    fn test_first_configured_match_wins_over_longer_prefix() {
        let classifier = MilitaryClassifier::new(&[
            group("FIRST", &["AB"]),
            group("SECOND", &["ABC"]),
        ]);
        let result = classifier.classify(Some("ABC12"));
        assert_eq!(result.military_country_group.as_deref(), Some("FIRST"));
    }

    #[test]
    fn test_group_order_beats_prefix_order_within_later_group() {
        let classifier = MilitaryClassifier::new(&[
            group("ALPHA", &["ZZ", "XY"]),
            group("BETA", &["X"]),
        ]);
        assert_eq!(
            classifier.classify(Some("XY1")).military_country_group.as_deref(),
            Some("ALPHA")
        );
        assert_eq!(
            classifier.classify(Some("XA1")).military_country_group.as_deref(),
            Some("BETA")
        );
    }

    #[test]
    fn test_short_callsign_never_matches_longer_prefix() {
        let classifier = MilitaryClassifier::new(&[group("US", &["REACH"])]);
        assert!(!classifier.classify(Some("REA")).is_military);
    }

    #[test]
    fn test_rules_flattened_in_order() {
        let classifier = MilitaryClassifier::new(&[
            group("A", &["p1", "p2"]),
            group("B", &["p3"]),
        ]);
        let prefixes: Vec<&str> = classifier.rules().iter().map(|(_, p)| p.as_str()).collect();
        assert_eq!(prefixes, vec!["P1", "P2", "P3"]);
    }
}
