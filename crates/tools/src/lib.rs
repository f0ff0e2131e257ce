//! Tool Integration
//!
//! JSON tool surface over the quality analysis engine, for protocol servers
//! and the command line.

#![warn(missing_docs)]

pub mod r#trait;
pub mod registry;
pub mod quality;

pub use r#trait::{Parameter, Tool, ToolError, ToolExecutor, ToolInput, ToolOutput, ToolSchema};
pub use registry::ToolRegistry;
pub use quality::{QualityAnalyzerTool, DEFAULT_OUTPUT_DIRECTORY};
