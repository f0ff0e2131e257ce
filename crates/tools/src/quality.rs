//! Quality analyzer tool.
//!
//! Exposes the analysis engine as a single JSON tool with four actions:
//! `analyze_file`, `analyze_directory`, `compare_files` and
//! `suggest_improvements`. Relative paths resolve against the tool's output
//! directory.

use async_trait::async_trait;
use ctxaudit_core::{QualityReport, Severity};
use ctxaudit_quality::{
    common_issues, Comparison, ImprovementPlan, QualityAnalyzer, QualityError, QuickWin,
    ReportMap, GLOBAL_RECOMMENDATIONS,
};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::r#trait::{Parameter, Tool, ToolError, ToolInput, ToolOutput, ToolSchema};

/// Default base directory for relative paths.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "generated_contexts";

const TOOL_NAME: &str = "quality_analyzer";
const TOOL_DESCRIPTION: &str = "Analyze the quality of extracted context files";
const COMMON_ISSUE_LIMIT: usize = 10;
const ACTIONS: [&str; 4] = [
    "analyze_file",
    "analyze_directory",
    "compare_files",
    "suggest_improvements",
];

/// Which issues an `analyze_file` call reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeverityFilter {
    All,
    Only(Severity),
}

impl SeverityFilter {
    fn parse(value: Option<&str>) -> Result<Self, ToolError> {
        match value {
            None => Ok(Self::All),
            Some(v) if v.eq_ignore_ascii_case("all") => Ok(Self::All),
            Some(v) => v.parse().map(Self::Only).map_err(|e: ctxaudit_core::ParseEnumError| {
                ToolError::InvalidParameter {
                    name: "severity_filter".to_string(),
                    reason: e.to_string(),
                }
            }),
        }
    }

    fn apply(self, report: &mut QualityReport) {
        if let Self::Only(severity) = self {
            report.issues.retain(|i| i.severity == severity);
        }
    }
}

/// Tool adapter over [`QualityAnalyzer`].
pub struct QualityAnalyzerTool {
    analyzer: QualityAnalyzer,
    output_directory: PathBuf,
}

impl Default for QualityAnalyzerTool {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIRECTORY)
    }
}

impl QualityAnalyzerTool {
    /// Create a tool with a default analyzer.
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self::with_analyzer(QualityAnalyzer::new(), output_directory)
    }

    /// Create a tool around a configured analyzer.
    pub fn with_analyzer(analyzer: QualityAnalyzer, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            analyzer,
            output_directory: output_directory.into(),
        }
    }

    /// Base directory for relative paths.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_directory.join(path)
        }
    }

    fn directory_param(&self, input: &ToolInput) -> PathBuf {
        match input.str("directory_path") {
            Some(dir) => self.resolve(dir),
            None => self.output_directory.clone(),
        }
    }

    async fn dispatch(&self, input: &ToolInput) -> Result<Value, ToolError> {
        let action = input.str("action").unwrap_or_default();
        info!("quality_analyzer action: {}", action);

        match action {
            "analyze_file" => self.analyze_file(input).await,
            "analyze_directory" => self.analyze_directory(input).await,
            "compare_files" => self.compare_files(input).await,
            "suggest_improvements" => match input.str("file_path") {
                Some(file) => self.suggest_for_file(file).await,
                None => self.suggest_for_directory(input).await,
            },
            other => Err(ToolError::UnknownAction(other.to_string())),
        }
    }

    async fn existing_file(&self, file: &str) -> Result<PathBuf, ToolError> {
        let path = self.resolve(file);
        match tokio::fs::metadata(&path).await {
            Ok(_) => Ok(path),
            Err(_) => Err(QualityError::NotFound(path).into()),
        }
    }

    async fn analyze_file(&self, input: &ToolInput) -> Result<Value, ToolError> {
        let file = input.str("file_path").ok_or(ToolError::MissingParameter {
            name: "file_path",
            action: "analyze_file",
        })?;
        let filter = SeverityFilter::parse(input.str("severity_filter"))?;
        let include_recommendations = input.bool_or("include_recommendations", true);

        let path = self.existing_file(file).await?;
        let mut report = self.analyzer.analyze_file(&path).await;
        filter.apply(&mut report);

        Ok(json!({
            "file": path.display().to_string(),
            "quality_report": report_json(&report, include_recommendations),
            "summary": report.summary_text(),
            "action_required": report.overall() < self.analyzer.config().attention_threshold,
        }))
    }

    async fn analyze_directory(&self, input: &ToolInput) -> Result<Value, ToolError> {
        let directory = self.directory_param(input);
        let reports = self.analyzer.analyze_directory(&directory).await?;

        if reports.is_empty() {
            return Ok(json!({
                "message": "No files found to analyze",
                "directory": directory.display().to_string(),
            }));
        }

        let threshold = self.analyzer.config().attention_threshold;
        let mut file_summaries = Map::new();
        for (path, report) in &reports {
            file_summaries.insert(
                file_name(path),
                json!({
                    "overall_score": report.overall(),
                    "issues_count": report.issues.len(),
                    "critical_issues": report.count_severity(Severity::Critical),
                    "needs_attention": report.overall() < threshold,
                }),
            );
        }
        let average = reports.values().map(|r| r.overall()).sum::<f64>() / reports.len() as f64;

        Ok(json!({
            "directory": directory.display().to_string(),
            "files_analyzed": reports.len(),
            "summary_report": self.analyzer.generate_summary_report(&reports),
            "file_summaries": file_summaries,
            "average_score": average,
        }))
    }

    async fn compare_files(&self, input: &ToolInput) -> Result<Value, ToolError> {
        let files = input.str_list("file_paths")?;
        if files.len() < ctxaudit_quality::compare::MIN_COMPARE_FILES {
            return Err(QualityError::InsufficientFiles {
                required: ctxaudit_quality::compare::MIN_COMPARE_FILES,
                found: files.len(),
            }
            .into());
        }

        let paths: Vec<PathBuf> = files.iter().map(|f| self.resolve(f)).collect();
        let comparison = self.analyzer.compare_files(&paths).await?;

        Ok(json!({
            "comparison": comparison_json(&comparison),
            "recommendation": comparison.recommendation(),
        }))
    }

    async fn suggest_for_file(&self, file: &str) -> Result<Value, ToolError> {
        let path = self.existing_file(file).await?;
        let report = self.analyzer.analyze_file(&path).await;
        let mut plan = self.analyzer.improvement_plan(&report);
        plan.file = path.display().to_string();

        Ok(plan_json(&plan))
    }

    async fn suggest_for_directory(&self, input: &ToolInput) -> Result<Value, ToolError> {
        let directory = self.directory_param(input);
        let reports: ReportMap = self.analyzer.analyze_directory(&directory).await?;

        if reports.is_empty() {
            return Ok(json!({ "message": "No files found to analyze" }));
        }

        let common: Vec<Value> = common_issues(&reports, COMMON_ISSUE_LIMIT)
            .into_iter()
            .map(|c| {
                json!({
                    "category": c.category,
                    "description": c.description,
                    "occurrences": c.occurrences,
                    "severity": c.severity,
                    "recommendation": c.recommendation,
                })
            })
            .collect();

        Ok(json!({
            "directory": directory.display().to_string(),
            "files_analyzed": reports.len(),
            "common_issues": common,
            "global_recommendations": GLOBAL_RECOMMENDATIONS,
        }))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn report_json(report: &QualityReport, include_recommendations: bool) -> Value {
    let m = &report.metrics;
    let issues: Vec<Value> = report
        .issues
        .iter()
        .map(|issue| {
            let mut value = json!({
                "severity": issue.severity,
                "category": issue.category,
                "description": issue.description,
            });
            if include_recommendations {
                value["recommendation"] = json!(issue.recommendation);
            }
            if let Some(location) = &issue.location {
                value["location"] = json!(location);
            }
            value
        })
        .collect();

    let mut value = json!({
        "timestamp": report.timestamp.to_rfc3339(),
        "scores": {
            "overall": m.overall,
            "completeness": m.completeness,
            "consistency": m.consistency,
            "accuracy": m.accuracy,
            "usability": m.usability,
        },
        "issues": issues,
        "strengths": report.strengths,
        "confidence": report.confidence,
        "analysis_version": report.analysis_version,
    });
    if include_recommendations {
        value["improvements"] = json!(report.improvements);
    }
    value
}

fn comparison_json(comparison: &Comparison) -> Value {
    let mut files = Map::new();
    for file in &comparison.files {
        files.insert(
            file.name.clone(),
            json!({
                "overall_score": file.overall_score,
                "completeness": file.completeness,
                "consistency": file.consistency,
                "accuracy": file.accuracy,
                "usability": file.usability,
                "issues": file.issues,
                "strengths": file.strengths,
            }),
        );
    }

    let differences: Vec<Value> = comparison
        .biggest_differences
        .iter()
        .map(|d| {
            json!({
                "metric": d.metric,
                "range": d.range_text(),
                "difference": d.difference,
            })
        })
        .collect();

    json!({
        "files": files,
        "best_file": comparison.best_file,
        "worst_file": comparison.worst_file,
        "biggest_differences": differences,
    })
}

fn quick_win_json(win: &QuickWin) -> Value {
    json!({
        "action": win.action,
        "effort": win.effort,
        "impact": win.impact_text(),
    })
}

fn plan_json(plan: &ImprovementPlan) -> Value {
    let actions: Vec<Value> = plan
        .priority_actions
        .iter()
        .map(|a| {
            json!({
                "action": a.action,
                "impact": a.impact,
                "steps": a.steps,
            })
        })
        .collect();

    json!({
        "improvements": {
            "file": plan.file,
            "current_score": plan.current_score,
            "target_score": plan.target_score,
            "priority_actions": actions,
            "detailed_suggestions": plan.detailed_suggestions,
            "estimated_improvement": plan.estimated_improvement,
            "projected_score": plan.projected_score,
        },
        "quick_wins": plan.quick_wins.iter().map(quick_win_json).collect::<Vec<_>>(),
        "long_term_goals": plan.long_term_goals,
    })
}

#[async_trait]
impl Tool for QualityAnalyzerTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        TOOL_DESCRIPTION
    }

    async fn execute(&self, input: &ToolInput) -> ToolOutput {
        match self.dispatch(input).await {
            Ok(fields) => ToolOutput::success(fields),
            Err(e) => {
                error!("Quality analysis error: {}", e);
                e.into()
            }
        }
    }

    fn schema(&self) -> ToolSchema {
        let param = |name: &str, param_type: &str, description: &str| Parameter {
            name: name.to_string(),
            description: description.to_string(),
            param_type: param_type.to_string(),
            required: false,
            default: None,
            allowed: Vec::new(),
        };

        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: TOOL_DESCRIPTION.to_string(),
            parameters: vec![
                Parameter {
                    required: true,
                    allowed: ACTIONS.iter().map(|a| a.to_string()).collect(),
                    ..param("action", "string", "The quality analysis action to perform")
                },
                param(
                    "file_path",
                    "string",
                    "Path to the file to analyze (for analyze_file action)",
                ),
                param(
                    "directory_path",
                    "string",
                    "Path to directory to analyze (for analyze_directory action)",
                ),
                param(
                    "file_paths",
                    "array",
                    "List of file paths to compare (for compare_files action)",
                ),
                Parameter {
                    default: Some(json!(true)),
                    ..param(
                        "include_recommendations",
                        "boolean",
                        "Include improvement recommendations in the analysis",
                    )
                },
                Parameter {
                    default: Some(json!("all")),
                    allowed: ["all", "critical", "high", "medium", "low"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    ..param("severity_filter", "string", "Filter issues by severity level")
                },
            ],
        }
    }
}
