//! Side-by-side comparison of several reports.

use ctxaudit_core::{Metric, QualityReport};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::engine::QualityAnalyzer;
use crate::error::{QualityError, Result};

/// Fewest files a comparison accepts.
pub const MIN_COMPARE_FILES: usize = 2;

/// A metric whose spread across the compared files exceeds this is flagged.
pub const SPREAD_THRESHOLD: f64 = 20.0;

/// Scores of one compared file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileScores {
    /// File name without directories
    pub name: String,
    pub overall_score: f64,
    pub completeness: f64,
    pub consistency: f64,
    pub accuracy: f64,
    pub usability: f64,
    /// Number of issues
    pub issues: usize,
    pub strengths: Vec<String>,
}

impl FileScores {
    fn from_report(report: &QualityReport) -> Self {
        let path = Path::new(&report.file_path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| report.file_path.clone());
        let m = &report.metrics;

        Self {
            name,
            overall_score: m.overall,
            completeness: m.completeness,
            consistency: m.consistency,
            accuracy: m.accuracy,
            usability: m.usability,
            issues: report.issues.len(),
            strengths: report.strengths.clone(),
        }
    }

    fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Completeness => self.completeness,
            Metric::Consistency => self.consistency,
            Metric::Accuracy => self.accuracy,
            Metric::Usability => self.usability,
        }
    }
}

/// A metric that varies widely across the compared files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSpread {
    pub metric: Metric,
    pub min: f64,
    pub max: f64,
    pub difference: f64,
}

impl MetricSpread {
    /// `"min - max"` with one decimal.
    pub fn range_text(&self) -> String {
        format!("{:.1} - {:.1}", self.min, self.max)
    }
}

/// Result of comparing two or more reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Per-file scores, in input order
    pub files: Vec<FileScores>,
    /// First file with the highest overall score
    pub best_file: String,
    /// First file with the lowest overall score
    pub worst_file: String,
    pub biggest_differences: Vec<MetricSpread>,
}

impl Comparison {
    /// Compare `reports`; fails with fewer than two.
    pub fn from_reports(reports: &[QualityReport]) -> Result<Self> {
        if reports.len() < MIN_COMPARE_FILES {
            return Err(QualityError::InsufficientFiles {
                required: MIN_COMPARE_FILES,
                found: reports.len(),
            });
        }

        let files: Vec<FileScores> = reports.iter().map(FileScores::from_report).collect();

        let mut best = &files[0];
        let mut worst = &files[0];
        for file in &files[1..] {
            if file.overall_score > best.overall_score {
                best = file;
            }
            if file.overall_score < worst.overall_score {
                worst = file;
            }
        }
        let best_file = best.name.clone();
        let worst_file = worst.name.clone();

        let biggest_differences = Metric::ALL
            .into_iter()
            .filter_map(|metric| {
                let scores = files.iter().map(|f| f.get(metric));
                let min = scores.clone().fold(f64::INFINITY, f64::min);
                let max = scores.fold(f64::NEG_INFINITY, f64::max);
                let difference = max - min;
                (difference > SPREAD_THRESHOLD).then_some(MetricSpread {
                    metric,
                    min,
                    max,
                    difference,
                })
            })
            .collect();

        Ok(Self {
            files,
            best_file,
            worst_file,
            biggest_differences,
        })
    }

    /// Plain-text verdict naming the best and worst file and the metrics to
    /// focus on.
    pub fn recommendation(&self) -> String {
        let mut out = format!(
            "Best performing file: {}\nNeeds most improvement: {}\n",
            self.best_file, self.worst_file
        );

        if !self.biggest_differences.is_empty() {
            out.push_str("\nFocus areas for improvement:\n");
            for spread in &self.biggest_differences {
                out.push_str(&format!(
                    "- {}: varies by {:.1} points\n",
                    spread.metric.title(),
                    spread.difference
                ));
            }
        }

        out
    }
}

impl QualityAnalyzer {
    /// Analyze and compare the given files. Repeated paths count once and
    /// files that cannot be read are left out; fewer than two remaining is
    /// an error.
    pub async fn compare_files(&self, paths: &[PathBuf]) -> Result<Comparison> {
        let mut seen = HashSet::new();
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            if !seen.insert(path.as_path()) {
                debug!("Skipping repeated path {}", path.display());
                continue;
            }
            match self.try_analyze_file(path).await {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Leaving {} out of comparison: {}", path.display(), e),
            }
        }

        let comparison = Comparison::from_reports(&reports)?;
        info!(
            "Compared {} files: best {}, worst {}",
            comparison.files.len(),
            comparison.best_file,
            comparison.worst_file
        );
        Ok(comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(path: &str, scores: [f64; 4]) -> QualityReport {
        let mut report = QualityReport::new(path);
        for (metric, score) in Metric::ALL.into_iter().zip(scores) {
            report.metrics.set(metric, score);
        }
        report.metrics.calculate_overall();
        report
    }

    #[test]
    fn test_needs_two_files() {
        let err = Comparison::from_reports(&[report("/d/a.md", [80.0; 4])]).unwrap_err();
        assert!(matches!(err, QualityError::InsufficientFiles { required: 2, found: 1 }));
        assert!(Comparison::from_reports(&[]).is_err());
    }

    #[test]
    fn test_best_worst_and_spread() {
        let reports = [
            report("/d/a.md", [90.0, 80.0, 100.0, 70.0]),
            report("/d/b.md", [60.0, 85.0, 100.0, 65.0]),
            report("/d/c.md", [95.0, 90.0, 100.0, 95.0]),
        ];
        let comparison = Comparison::from_reports(&reports).unwrap();

        assert_eq!(comparison.best_file, "c.md");
        assert_eq!(comparison.worst_file, "b.md");
        let metrics: Vec<_> = comparison.biggest_differences.iter().map(|d| d.metric).collect();
        assert_eq!(metrics, vec![Metric::Completeness, Metric::Usability]);
        assert_eq!(comparison.biggest_differences[0].range_text(), "60.0 - 95.0");
        assert_eq!(comparison.files[1].name, "b.md");
    }

    #[test]
    fn test_ties_keep_first() {
        let reports = [report("/d/a.md", [80.0; 4]), report("/d/b.md", [80.0; 4])];
        let comparison = Comparison::from_reports(&reports).unwrap();
        assert_eq!(comparison.best_file, "a.md");
        assert_eq!(comparison.worst_file, "a.md");
        assert!(comparison.biggest_differences.is_empty());
        assert_eq!(
            comparison.recommendation(),
            "Best performing file: a.md\nNeeds most improvement: a.md\n"
        );
    }

    #[test]
    fn test_recommendation_lists_focus_areas() {
        let reports = [
            report("/d/a.md", [100.0, 100.0, 100.0, 100.0]),
            report("/d/b.md", [50.0, 100.0, 100.0, 100.0]),
        ];
        let text = Comparison::from_reports(&reports).unwrap().recommendation();
        assert!(text.contains("\nFocus areas for improvement:\n- Completeness: varies by 50.0 points\n"));
    }

    #[tokio::test]
    async fn test_compare_files_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.md");
        std::fs::write(&a, "# A\n\ntext\n").unwrap();
        let missing = dir.path().join("missing.md");

        let analyzer = QualityAnalyzer::new();
        let err = analyzer.compare_files(&[a.clone(), missing]).await.unwrap_err();
        assert!(matches!(err, QualityError::InsufficientFiles { found: 1, .. }));

        let b = dir.path().join("b.md");
        std::fs::write(&b, "# B\n\nexample text\n").unwrap();
        let comparison = analyzer.compare_files(&[a, b]).await.unwrap();
        assert_eq!(comparison.files.len(), 2);
        assert_eq!(comparison.best_file, "b.md");
    }

    #[tokio::test]
    async fn test_compare_files_counts_repeated_path_once() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.md");
        std::fs::write(&a, "# A\n\ntext\n").unwrap();

        let analyzer = QualityAnalyzer::new();
        let err = analyzer.compare_files(&[a.clone(), a]).await.unwrap_err();
        assert!(matches!(err, QualityError::InsufficientFiles { required: 2, found: 1 }));
    }
}
