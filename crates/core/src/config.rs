//! Analyzer configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::document::RECOGNIZED_FIELDS;
use crate::quality::Metric;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Per-metric pass thresholds. A sub-score below its threshold produces an
/// improvement suggestion and a priority action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub completeness: f64,
    pub consistency: f64,
    pub accuracy: f64,
    pub usability: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            completeness: 70.0,
            consistency: 75.0,
            accuracy: 80.0,
            usability: 70.0,
        }
    }
}

impl Thresholds {
    /// Threshold for one axis.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Completeness => self.completeness,
            Metric::Consistency => self.consistency,
            Metric::Accuracy => self.accuracy,
            Metric::Usability => self.usability,
        }
    }
}

/// Tuning knobs for report confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceModel {
    /// Starting confidence
    pub base: f64,
    /// Subtracted per critical issue
    pub per_critical_penalty: f64,
    /// Overall scores below this take `low_score_penalty`
    pub low_score_below: f64,
    pub low_score_penalty: f64,
    /// Overall scores below this (but not below `low_score_below`) take `mid_score_penalty`
    pub mid_score_below: f64,
    pub mid_score_penalty: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self {
            base: 0.9,
            per_critical_penalty: 0.1,
            low_score_below: 50.0,
            low_score_penalty: 0.2,
            mid_score_below: 70.0,
            mid_score_penalty: 0.1,
            floor: 0.3,
            ceiling: 1.0,
        }
    }
}

impl ConfidenceModel {
    /// Confidence for a report with `critical` critical issues and the given overall score.
    pub fn confidence(&self, critical: usize, overall: f64) -> f64 {
        let mut confidence = self.base - critical as f64 * self.per_critical_penalty;

        if overall < self.low_score_below {
            confidence -= self.low_score_penalty;
        } else if overall < self.mid_score_below {
            confidence -= self.mid_score_penalty;
        }

        confidence.clamp(self.floor, self.ceiling)
    }
}

/// Full analyzer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub thresholds: Thresholds,

    pub confidence: ConfidenceModel,

    /// Metadata fields whose absence costs completeness points
    pub required_metadata: Vec<String>,

    /// File extensions (without dot) picked up by directory analysis
    pub document_extensions: Vec<String>,

    /// File names starting with this character are skipped during directory analysis
    pub reserved_prefix: char,

    /// Follow symbolic links during directory analysis
    pub follow_symlinks: bool,

    /// Maximum number of files analyzed at the same time
    pub max_concurrency: usize,

    /// Overall score below which a file needs attention
    pub attention_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            confidence: ConfidenceModel::default(),
            required_metadata: RECOGNIZED_FIELDS.iter().map(|f| f.to_string()).collect(),
            document_extensions: vec!["md".to_string()],
            reserved_prefix: '@',
            follow_symlinks: true,
            max_concurrency: 8,
            attention_threshold: 70.0,
        }
    }
}

impl AnalyzerConfig {
    /// Parse a JSON configuration. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Override the thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Override the concurrency limit.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for metric in Metric::ALL {
            let value = self.thresholds.get(metric);
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} threshold must be between 0 and 100, got {}",
                    metric, value
                )));
            }
        }

        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid("max_concurrency must be at least 1".to_string()));
        }

        if self.document_extensions.is_empty() {
            return Err(ConfigError::Invalid("document_extensions must not be empty".to_string()));
        }

        if self.confidence.floor > self.confidence.ceiling {
            return Err(ConfigError::Invalid(format!(
                "confidence floor {} exceeds ceiling {}",
                self.confidence.floor, self.confidence.ceiling
            )));
        }

        Ok(())
    }

    /// Whether `extension` names an analyzable document.
    pub fn is_document_extension(&self, extension: &str) -> bool {
        self.document_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}
