//! Consistency: heading hierarchy, formatting conventions, declared levels.

use ctxaudit_core::{HeadingLevel, IssueCategory, Metric, QualityIssue, Severity};
use serde_json::Value;
use std::collections::BTreeSet;

use super::{ScoreCard, Scorer, ScoringInput};

const HIERARCHY_GAP_PENALTY: f64 = 5.0;
const FORMATTING_PENALTY: f64 = 3.0;
const LEVEL_MISMATCH_PENALTY: f64 = 10.0;

/// Scores structural and formatting consistency.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyScorer;

/// Declared `hierarchy_levels`, accepting a list or a comma-separated string.
/// Returns `None` when the field is absent or empty.
fn declared_levels(value: Option<&Value>) -> Option<BTreeSet<String>> {
    let levels: BTreeSet<String> = match value? {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Null | Value::Bool(false) => return None,
        other => BTreeSet::from([other.to_string()]),
    };

    if levels.is_empty() {
        None
    } else {
        Some(levels)
    }
}

fn format_set<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let items: Vec<&str> = items.into_iter().map(String::as_str).collect();
    format!("[{}]", items.join(", "))
}

impl Scorer for ConsistencyScorer {
    fn metric(&self) -> Metric {
        Metric::Consistency
    }

    fn score(&self, input: &ScoringInput<'_>) -> ScoreCard {
        let mut card = ScoreCard::default();
        let headings = &input.scan.headings;

        for level in HeadingLevel::ALL {
            let Some(parent) = level.parent() else {
                continue;
            };
            if headings.contains(level) && !headings.contains(parent) {
                card.issue(
                    HIERARCHY_GAP_PENALTY,
                    QualityIssue::new(
                        Severity::Low,
                        IssueCategory::Structure,
                        format!("{} headings found without {} parent", level, parent),
                        "Fix heading hierarchy to be sequential",
                    ),
                );
            }
        }

        let markers = &input.scan.list_markers;
        if markers.len() > 1 {
            let listed: Vec<String> = markers.iter().map(|m| format!("'{}'", m)).collect();
            card.issue(
                FORMATTING_PENALTY,
                QualityIssue::new(
                    Severity::Low,
                    IssueCategory::Formatting,
                    format!("Inconsistent list markers used: {}", listed.join(", ")),
                    "Use consistent list markers (preferably '-')",
                ),
            );
        }

        if input.scan.fence_styles.len() > 1 {
            card.issue(
                FORMATTING_PENALTY,
                QualityIssue::new(
                    Severity::Low,
                    IssueCategory::Formatting,
                    "Inconsistent code fence styles (``` and ~~~)",
                    "Use consistent code fence style (preferably ```)",
                ),
            );
        }

        if let Some(declared) = declared_levels(input.document.field("hierarchy_levels")) {
            let actual: BTreeSet<String> = headings.levels().map(|l| l.to_string()).collect();
            if declared != actual {
                card.issue(
                    LEVEL_MISMATCH_PENALTY,
                    QualityIssue::new(
                        Severity::Medium,
                        IssueCategory::Metadata,
                        format!(
                            "Declared hierarchy levels {} don't match actual {}",
                            format_set(&declared),
                            format_set(&actual)
                        ),
                        "Update hierarchy_levels to match content",
                    ),
                );
            }
        }

        card.strength_if(85.0, "Consistent structure and formatting");
        card.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorers::test_support::run;
    use serde_json::json;

    #[test]
    fn test_clean_structure() {
        let card = run(&ConsistencyScorer, "# A\n\n## B\n\n- one\n- two\n\n```rust\nx\n```\n");
        assert_eq!(card.score, 100.0);
        assert!(card.issues.is_empty());
        assert_eq!(card.strengths, vec!["Consistent structure and formatting".to_string()]);
    }

    #[test]
    fn test_l3_without_l2_is_single_gap() {
        let card = run(&ConsistencyScorer, "### Only Deep\n\ntext\n");
        assert_eq!(card.issues.len(), 1);
        assert_eq!(card.issues[0].description, "L3 headings found without L2 parent");
        assert_eq!(card.score, 95.0);
    }

    #[test]
    fn test_every_gap_type_reported() {
        let card = run(&ConsistencyScorer, "## B\n\nx\n\n#### D\n\ny\n");
        let descriptions: Vec<_> = card.issues.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["L2 headings found without L1 parent", "L4 headings found without L3 parent"]
        );
        assert_eq!(card.score, 90.0);
    }

    #[test]
    fn test_mixed_markers_and_fences() {
        let body = "# A\n\n- one\n* two\n\n```\na\n```\n\n~~~\nb\n~~~\n";
        let card = run(&ConsistencyScorer, body);
        assert_eq!(card.score, 94.0);
        assert_eq!(card.issues.len(), 2);
        assert_eq!(card.issues[0].description, "Inconsistent list markers used: '*', '-'");
        assert!(card.issues.iter().all(|i| i.category == IssueCategory::Formatting));
    }

    #[test]
    fn test_declared_levels_mismatch() {
        let card = run(&ConsistencyScorer, "---\nhierarchy_levels: [L1, L2]\n---\n# Only Top\n\ntext\n");
        assert_eq!(card.score, 90.0);
        assert_eq!(card.issues.len(), 1);
        assert_eq!(card.issues[0].category, IssueCategory::Metadata);
        assert_eq!(
            card.issues[0].description,
            "Declared hierarchy levels [L1, L2] don't match actual [L1]"
        );
    }

    #[test]
    fn test_declared_levels_match() {
        let card = run(&ConsistencyScorer, "---\nhierarchy_levels: \"L2, L1\"\n---\n# A\n\n## B\n\ntext\n");
        assert!(card.issues.is_empty());
    }

    #[test]
    fn test_declared_levels_parsing() {
        assert_eq!(declared_levels(None), None);
        assert_eq!(declared_levels(Some(&json!([]))), None);
        assert_eq!(declared_levels(Some(&json!(null))), None);
        assert_eq!(
            declared_levels(Some(&json!(["L2", "L1", "L2"]))),
            Some(BTreeSet::from(["L1".to_string(), "L2".to_string()]))
        );
    }
}
