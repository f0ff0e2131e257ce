//! Report builder.
//!
//! [`QualityAnalyzer`] splits a document, scans its body once, runs the four
//! scorers in a fixed order and folds their output into a [`QualityReport`].

use ctxaudit_core::{
    AnalyzerConfig, Document, IssueCategory, Metric, QualityIssue, QualityReport, Severity,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::detect::{LanguageDetector, PatternUrlValidator, ScriptRatioDetector, UrlValidator};
use crate::error::{QualityError, Result};
use crate::frontmatter::split_front_matter;
use crate::scanner::StructureScan;
use crate::scorers::{
    AccuracyScorer, CompletenessScorer, ConsistencyScorer, Scorer, ScoringInput, UsabilityScorer,
};

/// Generic suggestion for a sub-score under its threshold.
fn threshold_recommendation(metric: Metric) -> &'static str {
    match metric {
        Metric::Completeness => "Focus on extracting more comprehensive content",
        Metric::Consistency => "Improve structural consistency and formatting",
        Metric::Accuracy => "Verify and correct metadata accuracy",
        Metric::Usability => "Enhance content usability with navigation aids",
    }
}

const CRITICAL_FIRST: &str = "Address critical issues immediately";
const HIGH_SECOND: &str = "Prioritize fixing high-severity issues";

/// More high-severity issues than this and fixing them becomes the second
/// improvement.
const HIGH_ISSUE_LIMIT: usize = 3;

/// Scores documents and builds reports.
pub struct QualityAnalyzer {
    config: AnalyzerConfig,
    language_detector: Arc<dyn LanguageDetector>,
    url_validator: Arc<dyn UrlValidator>,
    scorers: Vec<Box<dyn Scorer>>,
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QualityAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityAnalyzer")
            .field("config", &self.config)
            .field("scorers", &self.scorers.iter().map(|s| s.metric()).collect::<Vec<_>>())
            .finish()
    }
}

impl QualityAnalyzer {
    /// Create an analyzer with the default configuration and detectors.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create an analyzer with the given configuration.
    pub fn with_config(config: AnalyzerConfig) -> Self {
        let mut analyzer = Self {
            config,
            language_detector: Arc::new(ScriptRatioDetector::default()),
            url_validator: Arc::new(PatternUrlValidator),
            scorers: Vec::new(),
        };
        analyzer.rebuild_scorers();
        analyzer
    }

    /// Substitute the language detector used by the accuracy scorer.
    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.language_detector = detector;
        self.rebuild_scorers();
        self
    }

    /// Substitute the URL validator used by the accuracy scorer.
    pub fn with_url_validator(mut self, validator: Arc<dyn UrlValidator>) -> Self {
        self.url_validator = validator;
        self.rebuild_scorers();
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    // Order matters: issues are reported in scorer order.
    fn rebuild_scorers(&mut self) {
        self.scorers = vec![
            Box::new(CompletenessScorer::new(self.config.required_metadata.clone())),
            Box::new(ConsistencyScorer),
            Box::new(AccuracyScorer::new(
                Arc::clone(&self.language_detector),
                Arc::clone(&self.url_validator),
            )),
            Box::new(UsabilityScorer),
        ];
    }

    /// Analyze raw document text.
    pub fn analyze(&self, file_id: &str, content: &str) -> QualityReport {
        let document = split_front_matter(content);
        self.analyze_document(file_id, &document)
    }

    /// Analyze an already split document.
    pub fn analyze_document(&self, file_id: &str, document: &Document) -> QualityReport {
        let scan = StructureScan::scan(&document.body);
        let input = ScoringInput {
            document,
            scan: &scan,
        };

        let mut report = QualityReport::new(file_id);
        for scorer in &self.scorers {
            let card = scorer.score(&input);
            debug!(
                "{}: {} scored {:.1} with {} issues",
                file_id,
                scorer.metric(),
                card.score,
                card.issues.len()
            );
            report.metrics.set(scorer.metric(), card.score);
            report.issues.extend(card.issues);
            report.improvements.extend(card.improvements);
            report.strengths.extend(card.strengths);
        }

        self.finalize(&mut report);
        info!("Quality analysis of {} complete. Overall score: {:.1}", file_id, report.overall());
        report
    }

    /// Read and analyze a file, surfacing read failures to the caller.
    pub async fn try_analyze_file(&self, path: &Path) -> Result<QualityReport> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                QualityError::NotFound(path.to_path_buf())
            } else {
                QualityError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Ok(self.analyze(&path.display().to_string(), &content))
    }

    /// Read and analyze a file. Never fails: a read error becomes a
    /// critical system issue inside an otherwise empty report.
    pub async fn analyze_file(&self, path: &Path) -> QualityReport {
        match self.try_analyze_file(path).await {
            Ok(report) => report,
            Err(e) => {
                error!("Error analyzing file: {}", e);
                let mut report = QualityReport::new(path.display().to_string());
                report.issues.push(QualityIssue::new(
                    Severity::Critical,
                    IssueCategory::System,
                    format!("Analysis error: {}", e),
                    "Fix file format or content errors",
                ));
                self.finalize(&mut report);
                report
            }
        }
    }

    fn finalize(&self, report: &mut QualityReport) {
        report.metrics.calculate_overall();
        self.add_recommendations(report);
        report.confidence = self
            .config
            .confidence
            .confidence(report.count_severity(Severity::Critical), report.overall());
    }

    fn add_recommendations(&self, report: &mut QualityReport) {
        for metric in Metric::ALL {
            if report.metrics.get(metric) < self.config.thresholds.get(metric) {
                report.improvements.push(threshold_recommendation(metric).to_string());
            }
        }

        if report.count_severity(Severity::Critical) > 0 {
            report.improvements.insert(0, CRITICAL_FIRST.to_string());
        }

        if report.count_severity(Severity::High) > HIGH_ISSUE_LIMIT {
            let at = report.improvements.len().min(1);
            report.improvements.insert(at, HIGH_SECOND.to_string());
        }
    }
}
