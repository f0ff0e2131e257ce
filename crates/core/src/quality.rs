//! Quality model - issues, metric scores, and per-document reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::Time;

/// Version tag stamped on every report.
pub const ANALYSIS_VERSION: &str = "1.0.0";

/// Error returned when a textual enum tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Issue severity. Variants are declared most severe first, so sorting
/// a list of severities puts critical issues at the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Lowercase tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseEnumError::new("severity", s)),
        }
    }
}

/// What part of a document an issue concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Structure,
    Content,
    Metadata,
    Formatting,
    /// The analyzer itself failed on the document.
    System,
}

impl IssueCategory {
    /// Lowercase tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Content => "content",
            Self::Metadata => "metadata",
            Self::Formatting => "formatting",
            Self::System => "system",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A defect found while scoring a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub description: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl QualityIssue {
    /// Create an issue with a fix recommendation.
    pub fn new(
        severity: Severity,
        category: IssueCategory,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            description: description.into(),
            recommendation: recommendation.into(),
            location: None,
        }
    }

    /// Attach a location hint.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// The four scored quality axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Completeness,
    Consistency,
    Accuracy,
    Usability,
}

impl Metric {
    /// All metrics in scoring order.
    pub const ALL: [Metric; 4] = [
        Self::Completeness,
        Self::Consistency,
        Self::Accuracy,
        Self::Usability,
    ];

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completeness => "completeness",
            Self::Consistency => "consistency",
            Self::Accuracy => "accuracy",
            Self::Usability => "usability",
        }
    }

    /// Capitalized name for human-facing text.
    pub fn title(self) -> &'static str {
        match self {
            Self::Completeness => "Completeness",
            Self::Consistency => "Consistency",
            Self::Accuracy => "Accuracy",
            Self::Usability => "Usability",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-scores in [0, 100] and their mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub completeness: f64,
    pub consistency: f64,
    pub accuracy: f64,
    pub usability: f64,
    /// Mean of the four sub-scores; valid after [`QualityMetrics::calculate_overall`].
    pub overall: f64,
}

impl QualityMetrics {
    /// Score for one axis.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Completeness => self.completeness,
            Metric::Consistency => self.consistency,
            Metric::Accuracy => self.accuracy,
            Metric::Usability => self.usability,
        }
    }

    /// Set the score for one axis, clamped to [0, 100].
    pub fn set(&mut self, metric: Metric, score: f64) {
        let score = score.clamp(0.0, 100.0);
        match metric {
            Metric::Completeness => self.completeness = score,
            Metric::Consistency => self.consistency = score,
            Metric::Accuracy => self.accuracy = score,
            Metric::Usability => self.usability = score,
        }
    }

    /// Recompute `overall` as the mean of the four sub-scores.
    pub fn calculate_overall(&mut self) -> f64 {
        let sum: f64 = Metric::ALL.iter().map(|m| self.get(*m)).sum();
        self.overall = sum / Metric::ALL.len() as f64;
        self.overall
    }
}

/// Complete analysis of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// File identifier the report was produced for
    pub file_path: String,

    /// When the analysis ran (UTC)
    pub timestamp: Time,

    pub metrics: QualityMetrics,

    /// Issues in discovery order
    pub issues: Vec<QualityIssue>,

    /// Improvement suggestions, most urgent first
    pub improvements: Vec<String>,

    pub strengths: Vec<String>,

    /// Self-assessed reliability of this report, in [0.3, 1.0]
    pub confidence: f64,

    pub analysis_version: String,
}

impl QualityReport {
    /// Create an empty report stamped with the current time.
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            timestamp: chrono::Utc::now(),
            metrics: QualityMetrics::default(),
            issues: Vec::new(),
            improvements: Vec::new(),
            strengths: Vec::new(),
            confidence: 0.0,
            analysis_version: ANALYSIS_VERSION.to_string(),
        }
    }

    /// Overall score.
    pub fn overall(&self) -> f64 {
        self.metrics.overall
    }

    /// Number of issues with the given severity.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Issues with the given severity, in discovery order.
    pub fn issues_with_severity(&self, severity: Severity) -> impl Iterator<Item = &QualityIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// Issues ordered most severe first; equal severities keep discovery order.
    pub fn issues_by_severity(&self) -> Vec<&QualityIssue> {
        let mut issues: Vec<_> = self.issues.iter().collect();
        issues.sort_by_key(|i| i.severity);
        issues
    }

    /// Short plain-text digest of the report.
    pub fn summary_text(&self) -> String {
        let m = &self.metrics;
        let mut out = format!("Overall Quality Score: {:.1}/100\n", m.overall);

        out.push_str("\nScore Breakdown:\n");
        for metric in Metric::ALL {
            out.push_str(&format!("- {}: {:.1}\n", metric.title(), m.get(metric)));
        }

        if !self.issues.is_empty() {
            out.push_str(&format!("\nIssues Found: {}", self.issues.len()));
            let critical = self.count_severity(Severity::Critical);
            let high = self.count_severity(Severity::High);
            if critical > 0 {
                out.push_str(&format!(" ({} critical)", critical));
            }
            if high > 0 {
                out.push_str(&format!(" ({} high priority)", high));
            }
            out.push('\n');
        }

        if !self.strengths.is_empty() {
            out.push_str(&format!("\nStrengths: {}\n", self.strengths.join(", ")));
        }

        if let Some(top) = self.improvements.first() {
            out.push_str(&format!("\nTop Recommendation: {}\n", top));
        }

        out
    }
}
