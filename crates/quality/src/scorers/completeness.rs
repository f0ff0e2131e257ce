//! Completeness: metadata coverage, body length, top-level structure.

use ctxaudit_core::{HeadingLevel, IssueCategory, Metric, QualityIssue, Severity, RECOGNIZED_FIELDS};

use super::{ScoreCard, Scorer, ScoringInput};

const MISSING_FIELD_PENALTY: f64 = 5.0;
const SHORT_CONTENT_PENALTY: f64 = 20.0;
const NO_L1_PENALTY: f64 = 10.0;
const EMPTY_SECTION_PENALTY: f64 = 5.0;

const MIN_WORDS: usize = 100;
const LISTED_SECTIONS: usize = 3;

/// Scores how much of the expected content is present.
#[derive(Debug, Clone)]
pub struct CompletenessScorer {
    required: Vec<String>,
}

impl Default for CompletenessScorer {
    fn default() -> Self {
        Self::new(RECOGNIZED_FIELDS.iter().map(|f| f.to_string()).collect())
    }
}

impl CompletenessScorer {
    /// Create a scorer requiring the given metadata fields.
    pub fn new(required: Vec<String>) -> Self {
        Self { required }
    }
}

impl Scorer for CompletenessScorer {
    fn metric(&self) -> Metric {
        Metric::Completeness
    }

    fn score(&self, input: &ScoringInput<'_>) -> ScoreCard {
        let mut card = ScoreCard::default();
        let scan = input.scan;

        let missing: Vec<&str> = self
            .required
            .iter()
            .filter(|field| !input.document.has_field(field))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            card.issue(
                missing.len() as f64 * MISSING_FIELD_PENALTY,
                QualityIssue::new(
                    Severity::Medium,
                    IssueCategory::Metadata,
                    format!("Missing required metadata fields: {}", missing.join(", ")),
                    "Add missing metadata fields to frontmatter",
                ),
            );
        }

        if scan.word_count < MIN_WORDS {
            card.issue(
                SHORT_CONTENT_PENALTY,
                QualityIssue::new(
                    Severity::High,
                    IssueCategory::Content,
                    format!("Content too short ({} words)", scan.word_count),
                    "Ensure comprehensive content extraction",
                ),
            );
        }

        if !scan.headings.contains(HeadingLevel::L1) {
            card.issue(
                NO_L1_PENALTY,
                QualityIssue::new(
                    Severity::Medium,
                    IssueCategory::Structure,
                    "No top-level (L1) headings found",
                    "Ensure proper heading hierarchy starting with L1",
                ),
            );
        }

        let empty = &scan.empty_sections;
        if !empty.is_empty() {
            let listed = empty
                .iter()
                .take(LISTED_SECTIONS)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let more = if empty.len() > LISTED_SECTIONS { "..." } else { "" };
            card.issue(
                empty.len() as f64 * EMPTY_SECTION_PENALTY,
                QualityIssue::new(
                    Severity::Low,
                    IssueCategory::Content,
                    format!("Empty sections found: {}{}", listed, more),
                    "Remove empty sections or add content",
                ),
            );
        }

        card.strength_if(90.0, "Comprehensive content with complete metadata");
        card.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorers::test_support::run;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_complete_document_scores_full() {
        let text = format!(
            "---\ntitle: T\nsource_url: https://example.com\nextraction_timestamp: 2025-08-04T10:00:00Z\nextracted_by: test\nhierarchy_levels: [L1]\nlanguage: en\nextraction_confidence: 0.9\nlast_updated: 2025-08-04\n---\n# Title\n\n{}\n",
            words(120)
        );
        let card = run(&CompletenessScorer::default(), &text);

        assert_eq!(card.score, 100.0);
        assert!(card.issues.is_empty());
        assert_eq!(card.strengths, vec!["Comprehensive content with complete metadata".to_string()]);
    }

    #[test]
    fn test_missing_fields_single_issue() {
        let text = format!("---\ntitle: T\n---\n# Title\n\n{}\n", words(120));
        let card = run(&CompletenessScorer::default(), &text);

        assert_eq!(card.score, 65.0);
        assert_eq!(card.issues.len(), 1);
        assert_eq!(card.issues[0].category, IssueCategory::Metadata);
        assert!(card.issues[0].description.starts_with("Missing required metadata fields: source_url, extraction_timestamp"));
    }

    #[test]
    fn test_configured_required_fields() {
        let scorer = CompletenessScorer::new(vec!["title".to_string()]);
        let text = format!("---\ntitle: T\n---\n# Title\n\n{}\n", words(120));
        assert_eq!(run(&scorer, &text).score, 100.0);
    }

    #[test]
    fn test_short_content() {
        let scorer = CompletenessScorer::new(Vec::new());
        let card = run(&scorer, "# Title\n\nToo few words here.");

        assert_eq!(card.score, 80.0);
        assert_eq!(card.issues[0].severity, Severity::High);
        assert!(card.issues[0].description.contains("too short (6 words)"));
    }

    #[test]
    fn test_missing_l1_and_empty_sections() {
        let scorer = CompletenessScorer::new(Vec::new());
        let text = format!("## A\n## B\n## C\n## D\n\n{}", words(100));
        let card = run(&scorer, &text);

        // no L1 (-10), three empty sections (-15)
        assert_eq!(card.score, 75.0);
        let empty = card.issues.iter().find(|i| i.description.starts_with("Empty sections")).unwrap();
        assert_eq!(empty.description, "Empty sections found: ## A, ## B, ## C");
    }

    #[test]
    fn test_empty_section_list_truncated() {
        let scorer = CompletenessScorer::new(Vec::new());
        let text = format!("# T\n\n{}\n\n## A\n## B\n## C\n## D\n## E\n\nbody", words(100));
        let card = run(&scorer, &text);

        let empty = card.issues.iter().find(|i| i.description.starts_with("Empty sections")).unwrap();
        assert_eq!(empty.description, "Empty sections found: ## A, ## B, ## C...");
        assert_eq!(card.score, 80.0);
    }

    #[test]
    fn test_more_missing_fields_never_raise_score() {
        let body = format!("# Title\n\n{}\n", words(120));
        let fuller = run(&CompletenessScorer::default(), &format!("---\ntitle: T\nlanguage: en\n---\n{}", body));
        let thinner = run(&CompletenessScorer::default(), &format!("---\ntitle: T\n---\n{}", body));
        assert!(thinner.score <= fuller.score);
    }

    #[test]
    fn test_score_floor() {
        let text = "## A\n## B\n## C\n## D\n## E\n## F\n## G\n## H\n";
        let card = run(&CompletenessScorer::default(), text);
        assert_eq!(card.score, 0.0);
    }
}
