//! Tool registry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::r#trait::{Tool, ToolError, ToolExecutor, ToolInput, ToolOutput, ToolSchema};

/// Runs registered tools by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a registry with the given tools.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let tools = tools
            .into_iter()
            .map(|t| (t.name().to_string(), t))
            .collect();

        Self { tools }
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Schemas of every registered tool, sorted by name.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute_tool(&self, tool: &str, input: ToolInput) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(tool)
            .ok_or_else(|| ToolError::UnknownTool(tool.to_string()))?;

        debug!("Executing tool: {}", tool.name());
        Ok(tool.execute(&input).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QualityAnalyzerTool;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::default();
        let err = registry.execute_tool("nope", ToolInput::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: nope");
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ToolRegistry::default();
        registry.register_tool(Arc::new(QualityAnalyzerTool::new(dir.path())));

        assert!(registry.get("quality_analyzer").is_some());
        assert_eq!(registry.schemas().len(), 1);

        let input = ToolInput::from_value(json!({"action": "analyze_directory"})).unwrap();
        let output = registry.execute_tool("quality_analyzer", input).await.unwrap();
        assert!(output.is_success());
        assert_eq!(output.get("message"), Some(&json!("No files found to analyze")));
    }

    #[tokio::test]
    async fn test_new_registers_each_tool() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::new(vec![Arc::new(QualityAnalyzerTool::new(dir.path()))]);

        let input = ToolInput::from_value(json!({"action": "explode"})).unwrap();
        let output = registry.execute_tool("quality_analyzer", input).await.unwrap();
        assert_eq!(
            output.into_value(),
            json!({"status": "error", "error": "Unknown action: explode"})
        );
    }
}
