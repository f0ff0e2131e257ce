//! Usability: navigation aids, code tagging, link health, readability.

use ctxaudit_core::{HeadingLevel, IssueCategory, Metric, QualityIssue, Severity};

use super::{ScoreCard, Scorer, ScoringInput};

const MISSING_TOC_PENALTY: f64 = 10.0;
const UNTAGGED_CODE_PENALTY: f64 = 2.0;
const BROKEN_LINK_PENALTY: f64 = 3.0;
const LONG_SENTENCE_PENALTY: f64 = 5.0;
const NO_EXAMPLES_PENALTY: f64 = 5.0;

/// More L2 sections than this and a table of contents is expected.
const TOC_SECTION_LIMIT: usize = 5;
const MAX_AVG_SENTENCE_WORDS: f64 = 30.0;

const TOC_MARKERS: [&str; 3] = ["table of contents", "contents", "目次"];
const EXAMPLE_MARKERS: [&str; 2] = ["example", "例"];
const SUMMARY_MARKERS: [&str; 3] = ["summary", "overview", "概要"];

/// Scores how easy a document is to navigate and read.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsabilityScorer;

fn mentions_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

impl Scorer for UsabilityScorer {
    fn metric(&self) -> Metric {
        Metric::Usability
    }

    fn score(&self, input: &ScoringInput<'_>) -> ScoreCard {
        let mut card = ScoreCard::default();
        let scan = input.scan;
        let text = input.document.body.to_lowercase();

        if !mentions_any(&text, &TOC_MARKERS) && scan.headings.count(HeadingLevel::L2) > TOC_SECTION_LIMIT {
            card.improvement(MISSING_TOC_PENALTY, "Add a table of contents for better navigation");
        }

        let untagged = scan.untagged_code_blocks();
        if untagged > 0 {
            card.issue(
                untagged as f64 * UNTAGGED_CODE_PENALTY,
                QualityIssue::new(
                    Severity::Low,
                    IssueCategory::Formatting,
                    format!("{} code blocks without language specification", untagged),
                    "Add language identifiers to code blocks (e.g., ```python)",
                ),
            );
        }

        let broken: Vec<&str> = scan.broken_links().map(|l| l.anchor.as_str()).collect();
        if !broken.is_empty() {
            card.issue(
                broken.len() as f64 * BROKEN_LINK_PENALTY,
                QualityIssue::new(
                    Severity::Medium,
                    IssueCategory::Content,
                    format!("{} broken internal links found", broken.len()),
                    "Fix internal link anchors to match heading IDs",
                )
                .at(broken.iter().map(|a| format!("#{}", a)).collect::<Vec<_>>().join(", ")),
            );
        }

        if scan.avg_sentence_length > MAX_AVG_SENTENCE_WORDS {
            card.improvement(
                LONG_SENTENCE_PENALTY,
                "Consider breaking long sentences for better readability",
            );
        }

        if mentions_any(&text, &EXAMPLE_MARKERS) {
            card.strengths.push("Includes helpful examples".to_string());
        } else {
            card.improvement(NO_EXAMPLES_PENALTY, "Add examples to illustrate concepts");
        }

        if mentions_any(&text, &SUMMARY_MARKERS) {
            card.strengths.push("Includes summary sections".to_string());
        }

        card.strength_if(85.0, "Highly usable with good navigation and examples");
        card.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorers::test_support::run;

    #[test]
    fn test_examples_and_summary_are_strengths() {
        let card = run(&UsabilityScorer, "# Guide\n\n## Overview\n\nFor example, run it.\n");
        assert_eq!(card.score, 100.0);
        assert_eq!(
            card.strengths,
            vec![
                "Includes helpful examples".to_string(),
                "Includes summary sections".to_string(),
                "Highly usable with good navigation and examples".to_string(),
            ]
        );
        assert!(card.improvements.is_empty());
    }

    #[test]
    fn test_missing_examples() {
        let card = run(&UsabilityScorer, "# Guide\n\nNothing illustrative.\n");
        assert_eq!(card.score, 95.0);
        assert_eq!(card.improvements, vec!["Add examples to illustrate concepts".to_string()]);
        assert!(card.issues.is_empty());
    }

    #[test]
    fn test_japanese_markers() {
        let card = run(&UsabilityScorer, "# ガイド\n\n## 概要\n\n例を示します。\n");
        assert_eq!(card.score, 100.0);
        assert_eq!(card.strengths.len(), 3);
    }

    #[test]
    fn test_toc_expected_past_five_sections() {
        let sections: String = (1..=6).map(|i| format!("## Part {}\n\nexample\n\n", i)).collect();
        let card = run(&UsabilityScorer, &sections);
        assert_eq!(card.score, 90.0);
        assert_eq!(card.improvements, vec!["Add a table of contents for better navigation".to_string()]);

        let with_toc = format!("Contents\n\n{}", sections);
        assert_eq!(run(&UsabilityScorer, &with_toc).score, 100.0);

        let five: String = (1..=5).map(|i| format!("## Part {}\n\nexample\n\n", i)).collect();
        assert_eq!(run(&UsabilityScorer, &five).score, 100.0);
    }

    #[test]
    fn test_untagged_code_blocks() {
        let body = "example\n\n```\na\n```\n\n```\nb\n```\n\n```rust\nc\n```\n";
        let card = run(&UsabilityScorer, body);
        assert_eq!(card.score, 96.0);
        assert_eq!(card.issues[0].description, "2 code blocks without language specification");
    }

    #[test]
    fn test_broken_links() {
        let body = "# Setup Guide\n\nexample: [ok](#setup-guide), [a](#gone), [b](#missing)\n";
        let card = run(&UsabilityScorer, body);
        assert_eq!(card.score, 94.0);
        let issue = &card.issues[0];
        assert_eq!(issue.severity, Severity::Medium);
        assert_eq!(issue.description, "2 broken internal links found");
        assert_eq!(issue.location.as_deref(), Some("#gone, #missing"));
    }

    #[test]
    fn test_long_sentences() {
        let body = format!("example {}.", vec!["word"; 40].join(" "));
        let card = run(&UsabilityScorer, &body);
        assert_eq!(card.score, 95.0);
        assert_eq!(
            card.improvements,
            vec!["Consider breaking long sentences for better readability".to_string()]
        );
    }
}
