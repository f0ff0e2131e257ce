//! ctxaudit core data models.
//!
//! This crate defines the data structures shared by the quality analysis
//! engine, the tool adapter and the command line front end.

#![warn(missing_docs)]

// Documents and their derived structure
mod document;

// Issues, metrics and reports
mod quality;

// Tunable analyzer settings
mod config;

// Document
pub use document::{Document, Metadata, HeadingLevel, HeadingIndex, RECOGNIZED_FIELDS};

// Quality
pub use quality::{
    Severity, IssueCategory, QualityIssue, Metric, QualityMetrics, QualityReport,
    ParseEnumError, ANALYSIS_VERSION,
};

// Config
pub use config::{AnalyzerConfig, Thresholds, ConfidenceModel, ConfigError};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
