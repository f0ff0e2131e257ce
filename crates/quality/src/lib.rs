//! Quality analysis engine.
//!
//! Scores front-matter annotated markdown documents on completeness,
//! consistency, accuracy and usability, and aggregates reports across a
//! corpus.

pub mod error;
pub mod frontmatter;
pub mod scanner;
pub mod detect;
pub mod scorers;
pub mod engine;
pub mod corpus;
pub mod compare;
pub mod plan;

pub use error::{QualityError, Result};
pub use frontmatter::split_front_matter;
pub use scanner::StructureScan;
pub use detect::{is_iso_timestamp, LanguageDetector, PatternUrlValidator, ScriptRatioDetector, UrlValidator};
pub use scorers::{Scorer, ScoreCard, ScoringInput};
pub use engine::QualityAnalyzer;
pub use corpus::{common_issues, discover_documents, CommonIssue, CorpusSummary, FileScore, ReportMap};
pub use compare::{Comparison, FileScores, MetricSpread};
pub use plan::{
    quick_wins, suggest_improvements, ImprovementPlan, Impact, PriorityAction, QuickWin, Suggestion,
    GLOBAL_RECOMMENDATIONS,
};
