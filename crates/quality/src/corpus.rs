//! Corpus aggregation: directory walks, summaries, common issues.

use chrono::SecondsFormat;
use ctxaudit_core::{
    AnalyzerConfig, IssueCategory, Metric, QualityMetrics, QualityReport, Severity, Time,
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::engine::QualityAnalyzer;
use crate::error::{QualityError, Result};

/// Reports keyed by file path.
pub type ReportMap = BTreeMap<PathBuf, QualityReport>;

const TOP_FILES: usize = 5;
const ATTENTION_FILES: usize = 5;

/// Analyzable documents under `root`, in traversal order.
///
/// Files whose name starts with the reserved prefix are skipped. Entries the
/// walker cannot read are logged and skipped. Symbolic links are followed
/// when `follow_symlinks` is set. The walk blocks; async callers go through
/// [`QualityAnalyzer::analyze_directory`].
pub fn discover_documents(root: &Path, config: &AnalyzerConfig) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(QualityError::NotADirectory(root.to_path_buf()));
    }

    let mut documents = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let reserved = entry
            .file_name()
            .to_string_lossy()
            .starts_with(config.reserved_prefix);
        if reserved {
            debug!("Skipping reserved file {}", entry.path().display());
            continue;
        }

        let analyzable = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| config.is_document_extension(e));
        if analyzable {
            documents.push(entry.into_path());
        }
    }

    Ok(documents)
}

impl QualityAnalyzer {
    /// Analyze every document under `root`.
    ///
    /// Files that cannot be read are logged and left out of the result.
    pub async fn analyze_directory(&self, root: &Path) -> Result<ReportMap> {
        let mut reports = ReportMap::new();
        self.analyze_directory_into(root, &mut reports).await?;
        Ok(reports)
    }

    /// Analyze every document under `root`, inserting each report into
    /// `reports` as soon as it completes.
    ///
    /// At most `max_concurrency` files are read at once. If the returned
    /// future is dropped early, `reports` keeps every entry finished so far.
    pub async fn analyze_directory_into(&self, root: &Path, reports: &mut ReportMap) -> Result<()> {
        let walk_root = root.to_path_buf();
        let config = self.config().clone();
        let paths =
            tokio::task::spawn_blocking(move || discover_documents(&walk_root, &config)).await??;
        info!("Analyzing {} files in {}", paths.len(), root.display());

        let analyzer = self;
        let mut results = stream::iter(paths)
            .map(move |path| async move {
                let result = analyzer.try_analyze_file(&path).await;
                (path, result)
            })
            .buffered(self.config().max_concurrency.max(1));

        while let Some((path, result)) = results.next().await {
            match result {
                Ok(report) => {
                    reports.insert(path, report);
                }
                Err(e) => error!("Failed to analyze {}: {}", path.display(), e),
            }
        }

        Ok(())
    }

    /// Markdown summary of a set of reports.
    pub fn generate_summary_report(&self, reports: &ReportMap) -> String {
        match CorpusSummary::from_reports(reports, self.config().attention_threshold) {
            Some(summary) => summary.render_markdown(chrono::Utc::now()),
            None => "No files analyzed.".to_string(),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One file's overall score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileScore {
    /// File name without directories
    pub name: String,
    pub path: PathBuf,
    pub overall: f64,
}

/// Aggregate view over a set of reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub files_analyzed: usize,
    /// Mean of every sub-score and of the overall score
    pub averages: QualityMetrics,
    /// Issue totals across all reports, every severity present
    pub issue_counts: BTreeMap<Severity, usize>,
    /// Highest overall scores, best first
    pub top_files: Vec<FileScore>,
    /// Lowest overall scores under the attention threshold, worst first
    pub needs_attention: Vec<FileScore>,
}

impl CorpusSummary {
    /// Summarize `reports`; `None` when there are none.
    pub fn from_reports(reports: &ReportMap, attention_threshold: f64) -> Option<Self> {
        if reports.is_empty() {
            return None;
        }
        let n = reports.len() as f64;

        let mut averages = QualityMetrics::default();
        for metric in Metric::ALL {
            let total: f64 = reports.values().map(|r| r.metrics.get(metric)).sum();
            averages.set(metric, total / n);
        }
        averages.overall = reports.values().map(|r| r.overall()).sum::<f64>() / n;

        let mut issue_counts: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        for issue in reports.values().flat_map(|r| &r.issues) {
            *issue_counts.entry(issue.severity).or_default() += 1;
        }

        let mut scores: Vec<FileScore> = reports
            .iter()
            .map(|(path, report)| FileScore {
                name: display_name(path),
                path: path.clone(),
                overall: report.overall(),
            })
            .collect();

        scores.sort_by(|a, b| b.overall.total_cmp(&a.overall));
        let top_files = scores.iter().take(TOP_FILES).cloned().collect();

        scores.sort_by(|a, b| a.overall.total_cmp(&b.overall));
        let needs_attention = scores
            .into_iter()
            .filter(|s| s.overall < attention_threshold)
            .take(ATTENTION_FILES)
            .collect();

        Some(Self {
            files_analyzed: reports.len(),
            averages,
            issue_counts,
            top_files,
            needs_attention,
        })
    }

    fn count(&self, severity: Severity) -> usize {
        self.issue_counts.get(&severity).copied().unwrap_or(0)
    }

    /// Render as the markdown summary report.
    pub fn render_markdown(&self, analysis_date: Time) -> String {
        let avg = &self.averages;
        let mut out = String::from("# Quality Analysis Summary Report\n\n## Overview\n");
        out.push_str(&format!("- **Files Analyzed**: {}\n", self.files_analyzed));
        out.push_str(&format!(
            "- **Analysis Date**: {}\n",
            analysis_date.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        out.push_str(&format!("- **Average Overall Score**: {:.1}/100\n", avg.overall));

        out.push_str("\n## Average Scores by Category\n");
        for metric in Metric::ALL {
            out.push_str(&format!("- **{}**: {:.1}/100\n", metric.title(), avg.get(metric)));
        }

        out.push_str("\n## Issues Summary\n");
        for severity in Severity::ALL {
            let label = match severity {
                Severity::Critical => "Critical",
                Severity::High => "High",
                Severity::Medium => "Medium",
                Severity::Low => "Low",
            };
            out.push_str(&format!("- **{}**: {}\n", label, self.count(severity)));
        }

        out.push_str("\n## Top Performing Files\n");
        for file in &self.top_files {
            out.push_str(&format!("- {}: {:.1}/100\n", file.name, file.overall));
        }

        out.push_str("\n## Files Needing Attention\n");
        for file in &self.needs_attention {
            out.push_str(&format!("- {}: {:.1}/100\n", file.name, file.overall));
        }

        out
    }
}

/// An issue that recurs across a corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonIssue {
    pub category: IssueCategory,
    pub description: String,
    pub occurrences: usize,
    /// Severity of the first occurrence
    pub severity: Severity,
    pub recommendation: String,
}

/// The `limit` most frequent `(category, description)` pairs, most frequent
/// first. Ties keep first-seen order.
pub fn common_issues(reports: &ReportMap, limit: usize) -> Vec<CommonIssue> {
    let mut seen: HashMap<(IssueCategory, &str), usize> = HashMap::new();
    let mut common: Vec<CommonIssue> = Vec::new();

    for issue in reports.values().flat_map(|r| &r.issues) {
        let key = (issue.category, issue.description.as_str());
        match seen.get(&key) {
            Some(&i) => common[i].occurrences += 1,
            None => {
                seen.insert(key, common.len());
                common.push(CommonIssue {
                    category: issue.category,
                    description: issue.description.clone(),
                    occurrences: 1,
                    severity: issue.severity,
                    recommendation: issue.recommendation.clone(),
                });
            }
        }
    }

    common.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    common.truncate(limit);
    common
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxaudit_core::QualityIssue;
    use std::fs;

    fn report_with(path: &str, overall: f64) -> (PathBuf, QualityReport) {
        let mut report = QualityReport::new(path);
        for metric in Metric::ALL {
            report.metrics.set(metric, overall);
        }
        report.metrics.calculate_overall();
        (PathBuf::from(path), report)
    }

    #[tokio::test]
    async fn test_reserved_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("guide.md"), "# Guide\n\ntext\n").unwrap();
        fs::write(dir.path().join("@index.md"), "# Index\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "# Not markdown\n").unwrap();

        let reports = QualityAnalyzer::new().analyze_directory(dir.path()).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports.contains_key(&dir.path().join("guide.md")));
    }

    #[tokio::test]
    async fn test_walk_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.md"), "# Top\n").unwrap();
        fs::write(dir.path().join("a/b/deep.MD"), "# Deep\n").unwrap();

        let config = AnalyzerConfig::default().with_max_concurrency(1);
        let found = discover_documents(dir.path(), &config).unwrap();
        assert_eq!(found.len(), 2);

        let reports = QualityAnalyzer::with_config(config).analyze_directory(dir.path()).await.unwrap();
        assert!(reports.contains_key(&dir.path().join("a/b/deep.MD")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_documents() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("shared.md"), "# Shared\n\ntext\n").unwrap();

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("local.md"), "# Local\n").unwrap();
        std::os::unix::fs::symlink(outside.path().join("shared.md"), dir.path().join("linked.md")).unwrap();

        let reports = QualityAnalyzer::new().analyze_directory(dir.path()).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.contains_key(&dir.path().join("linked.md")));

        let config = AnalyzerConfig {
            follow_symlinks: false,
            ..AnalyzerConfig::default()
        };
        let found = discover_documents(dir.path(), &config).unwrap();
        assert_eq!(found, vec![dir.path().join("local.md")]);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = QualityAnalyzer::new()
            .analyze_directory(&dir.path().join("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, QualityError::NotADirectory(_)));
        assert!(err.to_string().starts_with("Directory not found"));
    }

    #[tokio::test]
    async fn test_analyze_into_existing_map() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.md"), "# One\n").unwrap();

        let (path, report) = report_with("/elsewhere/kept.md", 50.0);
        let mut reports = ReportMap::from([(path.clone(), report)]);
        QualityAnalyzer::new().analyze_directory_into(dir.path(), &mut reports).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.contains_key(&path));
    }

    #[test]
    fn test_summary_lists() {
        let reports: ReportMap = [
            report_with("/d/a.md", 90.0),
            report_with("/d/b.md", 40.0),
            report_with("/d/c.md", 65.0),
            report_with("/d/e.md", 80.0),
        ]
        .into_iter()
        .collect();

        let summary = CorpusSummary::from_reports(&reports, 70.0).unwrap();
        assert_eq!(summary.files_analyzed, 4);
        assert!((summary.averages.overall - 68.75).abs() < 1e-9);
        let top: Vec<_> = summary.top_files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(top, vec!["a.md", "e.md", "c.md", "b.md"]);
        let low: Vec<_> = summary.needs_attention.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(low, vec!["b.md", "c.md"]);
        assert_eq!(summary.issue_counts.len(), 4);
    }

    #[test]
    fn test_render_markdown() {
        let (path, mut report) = report_with("/d/a.md", 60.0);
        report
            .issues
            .push(QualityIssue::new(Severity::High, IssueCategory::Content, "short", "expand"));
        let reports = ReportMap::from([(path, report)]);

        let summary = CorpusSummary::from_reports(&reports, 70.0).unwrap();
        let date = "2025-08-04T10:00:00Z".parse::<Time>().unwrap();
        let text = summary.render_markdown(date);

        assert!(text.starts_with("# Quality Analysis Summary Report"));
        assert!(text.contains("- **Files Analyzed**: 1\n"));
        assert!(text.contains("- **Analysis Date**: 2025-08-04T10:00:00Z\n"));
        assert!(text.contains("- **Usability**: 60.0/100\n"));
        assert!(text.contains("- **High**: 1\n- **Medium**: 0\n"));
        assert!(text.ends_with("## Files Needing Attention\n- a.md: 60.0/100\n"));
    }

    #[test]
    fn test_empty_summary() {
        let analyzer = QualityAnalyzer::new();
        assert_eq!(analyzer.generate_summary_report(&ReportMap::new()), "No files analyzed.");
    }

    #[test]
    fn test_common_issues_ranked_by_frequency() {
        let issue = |desc: &str| QualityIssue::new(Severity::Low, IssueCategory::Formatting, desc, "fix");
        let (pa, mut a) = report_with("/d/a.md", 80.0);
        let (pb, mut b) = report_with("/d/b.md", 80.0);
        a.issues.extend([issue("rare"), issue("common")]);
        b.issues.push(issue("common"));
        let reports = ReportMap::from([(pa, a), (pb, b)]);

        let common = common_issues(&reports, 10);
        assert_eq!(common.len(), 2);
        assert_eq!(common[0].description, "common");
        assert_eq!(common[0].occurrences, 2);
        assert_eq!(common[1].description, "rare");

        assert_eq!(common_issues(&reports, 1).len(), 1);
    }
}
