//! Errors surfaced by the quality engine.

use std::path::PathBuf;

/// Result alias for quality operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Errors that can occur while analyzing documents.
#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    /// The file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File not found
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Directory not found or not a directory
    #[error("Directory not found: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Not enough analyzable files for a comparison
    #[error("At least {required} files required for comparison, got {found}")]
    InsufficientFiles {
        /// Minimum number of files
        required: usize,
        /// Files that could be analyzed
        found: usize,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ctxaudit_core::ConfigError),

    /// The background directory walk did not finish
    #[error("Directory walk failed: {0}")]
    Walk(#[from] tokio::task::JoinError),
}
