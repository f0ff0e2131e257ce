//! Improvement plans derived from a report.

use ctxaudit_core::{IssueCategory, Metric, QualityReport, Severity, Thresholds};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::engine::QualityAnalyzer;

/// Score a plan aims for.
pub const TARGET_SCORE: f64 = 85.0;

/// Projected scores never exceed this.
pub const PROJECTION_CAP: f64 = 95.0;

const MAX_QUICK_WINS: usize = 3;

/// Advice that applies to every corpus.
pub const GLOBAL_RECOMMENDATIONS: [&str; 5] = [
    "Standardize metadata format across all files",
    "Implement consistent heading hierarchy",
    "Add examples to all documentation",
    "Include table of contents for long documents",
    "Validate all URLs and internal links",
];

/// How much a priority action matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Impact {
    High,
    Medium,
}

/// Remediation for one sub-score under its threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityAction {
    pub metric: Metric,
    pub action: String,
    pub impact: Impact,
    pub steps: Vec<String>,
    /// Points the overall score is expected to gain
    pub estimated_improvement: f64,
}

impl PriorityAction {
    fn for_metric(metric: Metric) -> Self {
        let (action, impact, steps, points): (&str, Impact, Vec<&str>, f64) = match metric {
            Metric::Completeness => (
                "Improve content completeness",
                Impact::High,
                vec!["Add missing metadata fields", "Expand short sections", "Include all hierarchy levels"],
                15.0,
            ),
            Metric::Consistency => (
                "Fix structural consistency",
                Impact::Medium,
                vec!["Correct heading hierarchy", "Standardize formatting", "Use consistent list markers"],
                10.0,
            ),
            Metric::Accuracy => (
                "Verify metadata accuracy",
                Impact::Medium,
                vec!["Fix timestamp formats", "Validate URLs", "Correct language tags"],
                5.0,
            ),
            Metric::Usability => (
                "Enhance usability",
                Impact::High,
                vec![
                    "Add table of contents",
                    "Include examples",
                    "Fix broken links",
                    "Add language to code blocks",
                ],
                10.0,
            ),
        };

        Self {
            metric,
            action: action.to_string(),
            impact,
            steps: steps.into_iter().map(str::to_string).collect(),
            estimated_improvement: points,
        }
    }
}

/// A cheap fix with a visible payoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickWin {
    pub action: String,
    pub effort: String,
    /// Expected gain in points
    pub points: u32,
}

impl QuickWin {
    fn new(action: &str, effort: &str, points: u32) -> Self {
        Self {
            action: action.to_string(),
            effort: effort.to_string(),
            points,
        }
    }

    /// `+N points`
    pub fn impact_text(&self) -> String {
        format!("+{} points", self.points)
    }
}

/// One issue restated as a fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub issue: String,
    pub severity: Severity,
    pub fix: String,
}

/// Prioritized improvement plan for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovementPlan {
    pub file: String,
    pub current_score: f64,
    pub target_score: f64,
    pub priority_actions: Vec<PriorityAction>,
    /// Issues grouped by category, in discovery order within a group
    pub detailed_suggestions: BTreeMap<IssueCategory, Vec<Suggestion>>,
    /// Sum of the priority actions' estimates
    pub estimated_improvement: f64,
    /// `min(95, current + estimated)`
    pub projected_score: f64,
    pub quick_wins: Vec<QuickWin>,
    /// The report's own improvement suggestions
    pub long_term_goals: Vec<String>,
}

/// Derive an improvement plan from `report`.
pub fn suggest_improvements(report: &QualityReport, thresholds: &Thresholds) -> ImprovementPlan {
    let priority_actions: Vec<PriorityAction> = Metric::ALL
        .into_iter()
        .filter(|m| report.metrics.get(*m) < thresholds.get(*m))
        .map(PriorityAction::for_metric)
        .collect();
    let estimated_improvement: f64 = priority_actions.iter().map(|a| a.estimated_improvement).sum();

    let mut detailed_suggestions: BTreeMap<IssueCategory, Vec<Suggestion>> = BTreeMap::new();
    for issue in &report.issues {
        detailed_suggestions.entry(issue.category).or_default().push(Suggestion {
            issue: issue.description.clone(),
            severity: issue.severity,
            fix: issue.recommendation.clone(),
        });
    }

    ImprovementPlan {
        file: report.file_path.clone(),
        current_score: report.overall(),
        target_score: TARGET_SCORE,
        priority_actions,
        detailed_suggestions,
        estimated_improvement,
        projected_score: (report.overall() + estimated_improvement).min(PROJECTION_CAP),
        quick_wins: quick_wins(report),
        long_term_goals: report.improvements.clone(),
    }
}

impl QualityAnalyzer {
    /// Improvement plan measured against this analyzer's thresholds.
    pub fn improvement_plan(&self, report: &QualityReport) -> ImprovementPlan {
        suggest_improvements(report, &self.config().thresholds)
    }
}

/// Up to three quick wins: minor metadata fixes, formatting clean-up and
/// missing examples.
pub fn quick_wins(report: &QualityReport) -> Vec<QuickWin> {
    let mut wins = Vec::new();

    let metadata = report
        .issues_with_severity(Severity::Low)
        .filter(|i| i.category == IssueCategory::Metadata)
        .count();
    if metadata > 0 {
        wins.push(QuickWin::new("Fix metadata issues", "5 minutes", metadata as u32 * 2));
    }

    let formatting = report
        .issues
        .iter()
        .filter(|i| i.category == IssueCategory::Formatting)
        .count();
    if formatting > 0 {
        wins.push(QuickWin::new("Standardize formatting", "10 minutes", formatting as u32 * 3));
    }

    if report.improvements.iter().any(|i| i.contains("Add examples")) {
        wins.push(QuickWin::new("Add 2-3 examples", "15 minutes", 5));
    }

    wins.truncate(MAX_QUICK_WINS);
    wins
}
