//! Registry - Specialist registration and discovery
//!
//! Every specialist the orchestrator can dispatch to is a [`Tool`]
//! registered here under a unique name.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Tool category for organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// Destination and place information
    Information,
    /// Product creation and payments
    Commerce,
}

impl ToolCategory {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Information => "information",
            Self::Commerce => "commerce",
        }
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tool metadata and schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema for parameters
    pub parameters: serde_json::Value,
    /// Tool category
    pub category: ToolCategory,
    /// Display name of the specialist behind the tool
    pub specialist: String,
    /// Whether the tool is enabled
    pub enabled: bool,
}

impl ToolDefinition {
    /// Create a new tool definition
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            specialist: name.clone(),
            name,
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            category: ToolCategory::Information,
            enabled: true,
        }
    }

    /// Set the parameters schema
    #[must_use]
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: ToolCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the specialist display name
    #[must_use]
    pub fn with_specialist(mut self, specialist: impl Into<String>) -> Self {
        self.specialist = specialist.into();
        self
    }

    /// Set enabled status
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Output data
    pub output: serde_json::Value,
    /// Error message if failed
    pub error: Option<String>,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolResult {
    /// Create a successful result
    #[must_use]
    pub fn success(output: serde_json::Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            output,
            error: None,
            duration_ms,
        }
    }

    /// Create a failed result
    #[must_use]
    pub fn failure(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            output: serde_json::Value::Null,
            error: Some(error.into()),
            duration_ms,
        }
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with given input
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult>;

    /// Validate input before execution
    fn validate_input(&self, input: &serde_json::Value) -> Result<()> {
        if !input.is_object() {
            return Err(Error::InvalidInput("Input must be an object".to_string()));
        }
        Ok(())
    }
}

/// Registry for managing tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    definitions: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let def = tool.definition();
        let name = def.name.clone();
        debug!(tool = %name, specialist = %def.specialist, "Registering tool");
        self.definitions.insert(name.clone(), def.clone());
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Get a tool definition by name
    #[must_use]
    pub fn get_definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.get(name)
    }

    /// Check if a tool exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names, sorted
    #[must_use]
    pub fn list_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// List enabled tool definitions
    #[must_use]
    pub fn list_enabled(&self) -> Vec<&ToolDefinition> {
        self.definitions.values().filter(|d| d.enabled).collect()
    }

    /// Disable a tool
    pub fn disable(&mut self, name: &str) -> bool {
        if let Some(def) = self.definitions.get_mut(name) {
            def.enabled = false;
            true
        } else {
            false
        }
    }

    /// Get tool count
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        definition: ToolDefinition,
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
            Ok(ToolResult::success(input, 0))
        }
    }

    #[test]
    fn test_tool_definition_builder() {
        let def = ToolDefinition::new("test_tool", "A test tool")
            .with_category(ToolCategory::Commerce)
            .with_specialist("Travel Payments Specialist");

        assert_eq!(def.name, "test_tool");
        assert_eq!(def.category, ToolCategory::Commerce);
        assert_eq!(def.specialist, "Travel Payments Specialist");
        assert!(def.enabled);
    }

    #[test]
    fn test_tool_result() {
        let success = ToolResult::success(serde_json::json!({"data": "test"}), 100);
        assert!(success.success);
        assert!(success.error.is_none());

        let failure = ToolResult::failure("test error", 50);
        assert!(!failure.success);
        assert_eq!(failure.error, Some("test error".to_string()));
    }

    #[test]
    fn test_registry_register_and_disable() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(EchoTool {
            definition: ToolDefinition::new("echo", "Echo input"),
        }));

        assert_eq!(registry.len(), 1);
        assert!(registry.has("echo"));
        assert_eq!(registry.list_names(), vec!["echo"]);
        assert_eq!(registry.list_enabled().len(), 1);

        assert!(registry.disable("echo"));
        assert!(!registry.disable("missing"));
        assert!(registry.list_enabled().is_empty());
    }

    #[test]
    fn test_default_validation_rejects_non_objects() {
        let tool = EchoTool {
            definition: ToolDefinition::new("echo", "Echo input"),
        };
        assert!(tool.validate_input(&serde_json::json!({})).is_ok());
        assert!(matches!(
            tool.validate_input(&serde_json::json!("text")),
            Err(Error::InvalidInput(_))
        ));
    }
}
