//! ctxaudit CLI - quality analysis for extracted context documents.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ctxaudit_core::{AnalyzerConfig, QualityReport};
use ctxaudit_quality::{Comparison, ImprovementPlan, QualityAnalyzer};
use ctxaudit_tools::{
    QualityAnalyzerTool, Tool, ToolExecutor, ToolInput, ToolRegistry, DEFAULT_OUTPUT_DIRECTORY,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ctxaudit")]
#[command(about = "Quality analysis for extracted context documents", long_about = None)]
struct Cli {
    /// JSON analyzer configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory for relative paths
    #[arg(long, global = true, env = "CTXAUDIT_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIRECTORY)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single file
    File {
        /// Document to analyze
        path: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze every document in a directory
    Dir {
        /// Directory to analyze (defaults to the output directory)
        path: Option<PathBuf>,
        /// Write the summary report to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compare two or more files
    Compare {
        /// Documents to compare
        #[arg(required = true, num_args = 2..)]
        paths: Vec<PathBuf>,
    },
    /// Suggest improvements for a file
    Suggest {
        /// Document to plan for
        path: PathBuf,
    },
    /// Run a raw quality_analyzer tool call
    Tool {
        /// JSON parameters, e.g. '{"action": "analyze_directory"}'
        params: String,
    },
    /// Print the tool's parameter schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("CTXAUDIT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    let analyzer = QualityAnalyzer::with_config(config);

    match cli.command {
        Commands::File { path, json } => {
            let path = resolve(&cli.output_dir, path);
            if !path.is_file() {
                bail!("File not found: {}", path.display());
            }

            let report = analyzer.analyze_file(&path).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&path, &report);
            }
        }
        Commands::Dir { path, output } => {
            let directory = path.map(|p| resolve(&cli.output_dir, p)).unwrap_or(cli.output_dir);
            if !directory.is_dir() {
                bail!("Directory not found: {}", directory.display());
            }

            println!("Analyzing files in {}...", directory.display());
            let reports = analyzer.analyze_directory(&directory).await?;
            if reports.is_empty() {
                println!("No files found to analyze.");
                return Ok(());
            }

            let summary = analyzer.generate_summary_report(&reports);
            println!("{}", summary);

            if let Some(output) = output {
                std::fs::write(&output, &summary)
                    .with_context(|| format!("writing {}", output.display()))?;
                println!("\nDetailed report saved to: {}", output.display());
            }
        }
        Commands::Compare { paths } => {
            let paths: Vec<PathBuf> = paths.into_iter().map(|p| resolve(&cli.output_dir, p)).collect();
            let comparison = analyzer.compare_files(&paths).await?;
            print_comparison(&comparison);
        }
        Commands::Suggest { path } => {
            let path = resolve(&cli.output_dir, path);
            if !path.is_file() {
                bail!("File not found: {}", path.display());
            }

            let report = analyzer.analyze_file(&path).await;
            print_plan(&analyzer.improvement_plan(&report));
        }
        Commands::Tool { params } => {
            let value: serde_json::Value =
                serde_json::from_str(&params).context("tool parameters must be JSON")?;
            let input = ToolInput::from_value(value)?;

            let tool = QualityAnalyzerTool::with_analyzer(analyzer, cli.output_dir);
            let registry = ToolRegistry::new(vec![Arc::new(tool)]);
            let output = registry.execute_tool("quality_analyzer", input).await?;
            info!("Tool call finished, success: {}", output.is_success());
            println!("{}", serde_json::to_string_pretty(&output.into_value())?);
        }
        Commands::Schema => {
            let tool = QualityAnalyzerTool::with_analyzer(analyzer, cli.output_dir);
            let schema = serde_json::json!({
                "name": tool.name(),
                "description": tool.description(),
                "parameters": tool.schema().to_json_schema(),
            });
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

/// Relative paths that do not exist as given are looked up under the output directory.
fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() || path.exists() {
        path
    } else {
        base.join(path)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_report(path: &Path, report: &QualityReport) {
    let m = &report.metrics;
    println!("\n=== Quality Report for {} ===", file_label(path));
    println!("Overall Score: {:.1}/100", m.overall);
    println!("\nScores:");
    println!("  Completeness: {:.1}", m.completeness);
    println!("  Consistency: {:.1}", m.consistency);
    println!("  Accuracy: {:.1}", m.accuracy);
    println!("  Usability: {:.1}", m.usability);
    println!("Confidence: {:.2}", report.confidence);

    if !report.issues.is_empty() {
        println!("\nIssues ({}):", report.issues.len());
        for issue in report.issues_by_severity() {
            println!("  [{}] {}", issue.severity, issue.description);
            if !issue.recommendation.is_empty() {
                println!("    → {}", issue.recommendation);
            }
        }
    }

    if !report.improvements.is_empty() {
        println!("\nRecommended Improvements:");
        for improvement in &report.improvements {
            println!("  • {}", improvement);
        }
    }

    if !report.strengths.is_empty() {
        println!("\nStrengths:");
        for strength in &report.strengths {
            println!("  ✓ {}", strength);
        }
    }
}

fn print_comparison(comparison: &Comparison) {
    println!("{:<32} {:>8} {:>8} {:>8} {:>8} {:>8}", "File", "Overall", "Compl.", "Consis.", "Accur.", "Usab.");
    for file in &comparison.files {
        println!(
            "{:<32} {:>8.1} {:>8.1} {:>8.1} {:>8.1} {:>8.1}",
            file.name, file.overall_score, file.completeness, file.consistency, file.accuracy, file.usability
        );
    }
    println!();
    for spread in &comparison.biggest_differences {
        println!("{}: {}", spread.metric.title(), spread.range_text());
    }
    print!("{}", comparison.recommendation());
}

fn print_plan(plan: &ImprovementPlan) {
    println!("Improvement plan for {}", plan.file);
    println!(
        "Current: {:.1}  Target: {:.1}  Projected: {:.1}",
        plan.current_score, plan.target_score, plan.projected_score
    );

    if !plan.priority_actions.is_empty() {
        println!("\nPriority actions:");
        for action in &plan.priority_actions {
            println!("  {} ({:?} impact, +{:.0})", action.action, action.impact, action.estimated_improvement);
            for step in &action.steps {
                println!("    - {}", step);
            }
        }
    }

    if !plan.quick_wins.is_empty() {
        println!("\nQuick wins:");
        for win in &plan.quick_wins {
            println!("  {} [{}] {}", win.action, win.effort, win.impact_text());
        }
    }

    for (category, suggestions) in &plan.detailed_suggestions {
        println!("\n{}:", category);
        for s in suggestions {
            println!("  [{}] {} → {}", s.severity, s.issue, s.fix);
        }
    }
}
