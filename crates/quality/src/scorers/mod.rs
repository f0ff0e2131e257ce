//! The four metric scorers.
//!
//! Each scorer starts from 100, subtracts a fixed penalty per defect and
//! never reads or writes state outside its own [`ScoreCard`].

mod completeness;
mod consistency;
mod accuracy;
mod usability;

pub use completeness::CompletenessScorer;
pub use consistency::ConsistencyScorer;
pub use accuracy::AccuracyScorer;
pub use usability::UsabilityScorer;

use ctxaudit_core::{Document, Metric, QualityIssue};

use crate::scanner::StructureScan;

const CEILING: f64 = 100.0;

/// What a scorer reads.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub document: &'a Document,
    pub scan: &'a StructureScan,
}

/// What a scorer produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    /// Score in [0, 100]
    pub score: f64,
    pub issues: Vec<QualityIssue>,
    pub strengths: Vec<String>,
    /// Suggestions that are not defects in their own right
    pub improvements: Vec<String>,
}

impl Default for ScoreCard {
    fn default() -> Self {
        Self {
            score: CEILING,
            issues: Vec::new(),
            strengths: Vec::new(),
            improvements: Vec::new(),
        }
    }
}

impl ScoreCard {
    fn deduct(&mut self, points: f64) {
        self.score -= points;
    }

    fn issue(&mut self, points: f64, issue: QualityIssue) {
        self.deduct(points);
        self.issues.push(issue);
    }

    fn improvement(&mut self, points: f64, text: &str) {
        self.deduct(points);
        self.improvements.push(text.to_string());
    }

    fn strength_if(&mut self, at_least: f64, text: &str) {
        if self.score >= at_least {
            self.strengths.push(text.to_string());
        }
    }

    fn finish(mut self) -> Self {
        self.score = self.score.max(0.0);
        self
    }
}

/// A single quality axis.
pub trait Scorer: Send + Sync {
    /// Axis this scorer fills in.
    fn metric(&self) -> Metric;

    /// Score one document.
    fn score(&self, input: &ScoringInput<'_>) -> ScoreCard;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_card_floor() {
        let mut card = ScoreCard::default();
        card.deduct(140.0);
        assert_eq!(card.finish().score, 0.0);
    }

    #[test]
    fn test_strength_threshold() {
        let mut card = ScoreCard::default();
        card.deduct(10.0);
        card.strength_if(90.0, "kept");
        card.strength_if(91.0, "dropped");
        assert_eq!(card.strengths, vec!["kept".to_string()]);
    }
}
