//! Accuracy: metadata values that can be checked against their expected shape.

use ctxaudit_core::{IssueCategory, Metric, QualityIssue, Severity};
use serde_json::Value;
use std::sync::Arc;

use super::{ScoreCard, Scorer, ScoringInput};
use crate::detect::{is_iso_timestamp, LanguageDetector, PatternUrlValidator, ScriptRatioDetector, UrlValidator};

const TIMESTAMP_PENALTY: f64 = 5.0;
const URL_PENALTY: f64 = 10.0;
const LANGUAGE_PENALTY: f64 = 5.0;
const CONFIDENCE_PENALTY: f64 = 5.0;

const TIMESTAMP_FIELDS: [&str; 2] = ["extraction_timestamp", "last_updated"];

/// Scores the correctness of metadata values.
#[derive(Clone)]
pub struct AccuracyScorer {
    language: Arc<dyn LanguageDetector>,
    urls: Arc<dyn UrlValidator>,
}

impl Default for AccuracyScorer {
    fn default() -> Self {
        Self::new(Arc::new(ScriptRatioDetector::default()), Arc::new(PatternUrlValidator))
    }
}

impl AccuracyScorer {
    /// Create a scorer with the given detectors.
    pub fn new(language: Arc<dyn LanguageDetector>, urls: Arc<dyn UrlValidator>) -> Self {
        Self { language, urls }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Scorer for AccuracyScorer {
    fn metric(&self) -> Metric {
        Metric::Accuracy
    }

    fn score(&self, input: &ScoringInput<'_>) -> ScoreCard {
        let mut card = ScoreCard::default();
        let doc = input.document;

        for field in TIMESTAMP_FIELDS {
            let Some(value) = doc.field(field) else {
                continue;
            };
            if !value.as_str().is_some_and(is_iso_timestamp) {
                card.issue(
                    TIMESTAMP_PENALTY,
                    QualityIssue::new(
                        Severity::Low,
                        IssueCategory::Metadata,
                        format!("Invalid timestamp format in {}", field),
                        "Use ISO 8601 format (YYYY-MM-DDTHH:MM:SSZ)",
                    )
                    .at(field),
                );
            }
        }

        if let Some(url) = doc.field("source_url") {
            if !url.as_str().is_some_and(|u| self.urls.is_valid(u)) {
                card.issue(
                    URL_PENALTY,
                    QualityIssue::new(
                        Severity::Medium,
                        IssueCategory::Metadata,
                        "Invalid source URL format",
                        "Ensure source_url is a valid URL",
                    )
                    .at("source_url"),
                );
            }
        }

        if let Some(declared) = doc.field("language") {
            let declared = value_text(declared);
            if let Some(detected) = self.language.detect(&doc.body) {
                if detected != declared {
                    card.issue(
                        LANGUAGE_PENALTY,
                        QualityIssue::new(
                            Severity::Low,
                            IssueCategory::Metadata,
                            format!(
                                "Language mismatch: declared '{}' but detected '{}'",
                                declared, detected
                            ),
                            "Verify and correct the language tag",
                        )
                        .at("language"),
                    );
                }
            }
        }

        if let Some(confidence) = doc.field("extraction_confidence") {
            let in_range = confidence.as_f64().is_some_and(|c| (0.0..=1.0).contains(&c));
            if !in_range {
                card.issue(
                    CONFIDENCE_PENALTY,
                    QualityIssue::new(
                        Severity::Low,
                        IssueCategory::Metadata,
                        "Invalid extraction confidence value",
                        "Confidence should be a number between 0 and 1",
                    )
                    .at("extraction_confidence"),
                );
            }
        }

        card.strength_if(90.0, "Accurate metadata and proper formatting");
        card.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorers::test_support::run;

    struct AlwaysFrench;

    impl LanguageDetector for AlwaysFrench {
        fn detect(&self, _text: &str) -> Option<String> {
            Some("fr".to_string())
        }
    }

    struct AcceptAll;

    impl UrlValidator for AcceptAll {
        fn is_valid(&self, _url: &str) -> bool {
            true
        }
    }

    #[test]
    fn test_valid_metadata() {
        let text = "---\nsource_url: https://example.com/docs\nextraction_timestamp: 2025-08-04T10:00:00Z\nlast_updated: 2025-08-01\nlanguage: en\nextraction_confidence: 0.85\n---\n# Doc\n\nEnglish text.\n";
        let card = run(&AccuracyScorer::default(), text);
        assert_eq!(card.score, 100.0);
        assert!(card.issues.is_empty());
        assert_eq!(card.strengths.len(), 1);
    }

    #[test]
    fn test_no_metadata_is_not_penalized() {
        let card = run(&AccuracyScorer::default(), "# Doc\n\ntext\n");
        assert_eq!(card.score, 100.0);
    }

    #[test]
    fn test_each_bad_timestamp_is_an_issue() {
        let text = "---\nextraction_timestamp: last tuesday\nlast_updated: 20250801\n---\nbody";
        let card = run(&AccuracyScorer::default(), text);
        assert_eq!(card.score, 90.0);
        assert_eq!(card.issues.len(), 2);
        assert_eq!(card.issues[0].description, "Invalid timestamp format in extraction_timestamp");
        assert_eq!(card.issues[1].description, "Invalid timestamp format in last_updated");
    }

    #[test]
    fn test_invalid_url() {
        let card = run(&AccuracyScorer::default(), "---\nsource_url: example dot com\n---\nbody");
        assert_eq!(card.score, 90.0);
        assert_eq!(card.issues[0].severity, Severity::Medium);
        assert_eq!(card.issues[0].location.as_deref(), Some("source_url"));
        assert_eq!(card.strengths.len(), 1);
    }

    #[test]
    fn test_language_mismatch() {
        let card = run(&AccuracyScorer::default(), "---\nlanguage: ja\n---\nThis body is English.");
        assert_eq!(card.score, 95.0);
        assert_eq!(card.issues[0].description, "Language mismatch: declared 'ja' but detected 'en'");
    }

    #[test]
    fn test_confidence_out_of_range() {
        for bad in ["1.5", "-0.1", "high", "true"] {
            let text = format!("---\nextraction_confidence: {}\n---\nbody", bad);
            let card = run(&AccuracyScorer::default(), &text);
            assert_eq!(card.score, 95.0, "value {}", bad);
        }
        let card = run(&AccuracyScorer::default(), "---\nextraction_confidence: 1\n---\nbody");
        assert_eq!(card.score, 100.0);
    }

    #[test]
    fn test_substituted_detectors() {
        let scorer = AccuracyScorer::new(Arc::new(AlwaysFrench), Arc::new(AcceptAll));
        let card = run(&scorer, "---\nlanguage: fr\nsource_url: not-a-url\n---\nbody");
        assert_eq!(card.score, 100.0);
    }
}
