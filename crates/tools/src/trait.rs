//! Tool abstraction.

use async_trait::async_trait;
use ctxaudit_quality::QualityError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Errors raised while dispatching a tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No tool registered under this name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The `action` parameter names no known action
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A parameter the action needs was not supplied
    #[error("{name} is required for {action} action")]
    MissingParameter {
        /// Parameter name
        name: &'static str,
        /// Action that needs it
        action: &'static str,
    },

    /// A parameter has the wrong type or value
    #[error("Invalid {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// The analysis itself failed
    #[error(transparent)]
    Quality(#[from] QualityError),
}

/// A tool that can be executed.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get tool name.
    fn name(&self) -> &str;

    /// Get tool description.
    fn description(&self) -> &str;

    /// Execute the tool. Failures are reported inside the output.
    async fn execute(&self, input: &ToolInput) -> ToolOutput;

    /// Get tool schema (for discovery by protocol clients).
    fn schema(&self) -> ToolSchema;
}

/// Tool executor - runs tools by name.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool by name.
    async fn execute_tool(&self, tool: &str, input: ToolInput) -> Result<ToolOutput, ToolError>;
}

/// Named parameters of a tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolInput {
    /// Raw parameters
    pub params: Map<String, Value>,
}

impl ToolInput {
    /// Empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Input from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(params) => Ok(Self { params }),
            other => Err(ToolError::InvalidParameter {
                name: "input".to_string(),
                reason: format!("expected a JSON object, got {}", other),
            }),
        }
    }

    /// Add a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// String parameter; `None` when absent, null or empty.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Boolean parameter with a default.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.params.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// List-of-strings parameter; empty when absent.
    pub fn str_list(&self, key: &str) -> Result<Vec<String>, ToolError> {
        let invalid = || ToolError::InvalidParameter {
            name: key.to_string(),
            reason: "expected an array of strings".to_string(),
        };

        match self.params.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect(),
            Some(_) => Err(invalid()),
        }
    }
}

/// Result of a tool call: a JSON object whose `status` is `success` or
/// `error`, with an `error` message in the latter case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolOutput(Value);

impl ToolOutput {
    /// Successful result. Object fields are kept at the top level; any
    /// other value is placed under `result`.
    pub fn success(fields: Value) -> Self {
        let mut object = match fields {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        object.insert("status".to_string(), json!("success"));
        Self(Value::Object(object))
    }

    /// Failed result.
    pub fn error(message: impl Into<String>) -> Self {
        Self(json!({
            "status": "error",
            "error": message.into(),
        }))
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        self.0.get("status").and_then(Value::as_str) == Some("success")
    }

    /// Error message of a failed call.
    pub fn error_message(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    /// Field of the result object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Underlying JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume into the underlying JSON.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<ToolError> for ToolOutput {
    fn from(e: ToolError) -> Self {
        Self::error(e.to_string())
    }
}

/// Tool schema for discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,

    /// Description
    pub description: String,

    /// Parameters
    pub parameters: Vec<Parameter>,
}

impl ToolSchema {
    /// JSON Schema object describing the parameters.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(param.param_type));
            if param.param_type == "array" {
                prop.insert("items".to_string(), json!({"type": "string"}));
            }
            if !param.allowed.is_empty() {
                prop.insert("enum".to_string(), json!(param.allowed));
            }
            if let Some(default) = &param.default {
                prop.insert("default".to_string(), default.clone());
            }
            prop.insert("description".to_string(), json!(param.description));
            properties.insert(param.name.clone(), Value::Object(prop));
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A tool parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,

    /// Description
    pub description: String,

    /// Type
    pub param_type: String,

    /// Required
    pub required: bool,

    /// Default value
    pub default: Option<serde_json::Value>,

    /// Allowed values, empty when unrestricted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
}
