//! Runner - Tool execution engine
//!
//! Every specialist call goes through [`ToolRunner::execute`], which
//! validates input, enforces a bounded timeout and logs the outcome.

use crate::error::{Error, Result};
use crate::registry::{ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Configuration for the tool runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Default timeout for tool execution
    pub default_timeout: Duration,
    /// Maximum timeout allowed
    pub max_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            max_timeout: Duration::from_secs(120),
        }
    }
}

impl RunnerConfig {
    /// Create a new configuration with default timeout
    #[must_use]
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            ..Default::default()
        }
    }

    /// Set the maximum timeout
    #[must_use]
    pub fn with_max_timeout(mut self, max_timeout: Duration) -> Self {
        self.max_timeout = max_timeout;
        self
    }
}

/// Options for a single tool execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Custom timeout for this execution
    pub timeout: Option<Duration>,
}

impl ExecutionOptions {
    /// Create options with a specific timeout
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Tool execution result with additional metadata
#[derive(Debug)]
pub struct ExecutionResult {
    /// The tool result
    pub result: ToolResult,
    /// Tool name
    pub tool_name: String,
    /// Specialist display name
    pub specialist: String,
}

/// Tool runner for executing registered tools
#[derive(Clone)]
pub struct ToolRunner {
    registry: Arc<ToolRegistry>,
    config: RunnerConfig,
}

impl ToolRunner {
    /// Create a new tool runner
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults(registry: Arc<ToolRegistry>) -> Self {
        Self::new(registry, RunnerConfig::default())
    }

    /// Get the registry
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute a tool by name
    pub async fn execute(
        &self,
        tool_name: &str,
        input: serde_json::Value,
    ) -> Result<ExecutionResult> {
        self.execute_with_options(tool_name, input, ExecutionOptions::default())
            .await
    }

    /// Execute a tool with custom options.
    ///
    /// Errors raised by the tool itself become a failed [`ToolResult`];
    /// an unknown or disabled tool, invalid input, or a timeout is
    /// returned as `Err`.
    #[instrument(skip(self, input, options), fields(tool = %tool_name))]
    pub async fn execute_with_options(
        &self,
        tool_name: &str,
        input: serde_json::Value,
        options: ExecutionOptions,
    ) -> Result<ExecutionResult> {
        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| Error::NotFound(tool_name.to_string()))?;

        let definition = self
            .registry
            .get_definition(tool_name)
            .unwrap_or_else(|| tool.definition());

        if !definition.enabled {
            return Err(Error::Disabled(tool_name.to_string()));
        }
        let specialist = definition.specialist.clone();

        tool.validate_input(&input)?;

        let execution_timeout = options
            .timeout
            .unwrap_or(self.config.default_timeout)
            .min(self.config.max_timeout);

        let start = Instant::now();
        debug!(tool = %tool_name, timeout_ms = %execution_timeout.as_millis(), "Executing tool");

        let result = match timeout(execution_timeout, tool.execute(input)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                let duration = start.elapsed().as_millis() as u64;
                warn!(tool = %tool_name, error = %e, "Tool execution failed");
                ToolResult::failure(e.to_string(), duration)
            }
            Err(_) => {
                warn!(tool = %tool_name, timeout_ms = %execution_timeout.as_millis(), "Tool execution timed out");
                return Err(Error::Timeout(execution_timeout.as_millis() as u64));
            }
        };

        debug!(
            tool = %tool_name,
            success = %result.success,
            duration_ms = %result.duration_ms,
            "Tool execution completed"
        );

        Ok(ExecutionResult {
            result,
            tool_name: tool_name.to_string(),
            specialist,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Tool, ToolDefinition};

    struct SlowTool {
        definition: ToolDefinition,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl Tool for SlowTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, _input: serde_json::Value) -> Result<ToolResult> {
            tokio::time::sleep(self.delay).await;
            Ok(ToolResult::success(serde_json::json!({"done": true}), 1))
        }
    }

    struct FailingTool {
        definition: ToolDefinition,
    }

    #[async_trait::async_trait]
    impl Tool for FailingTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, _input: serde_json::Value) -> Result<ToolResult> {
            Err(Error::Execution("provider unavailable".to_string()))
        }
    }

    fn runner_with(tools: Vec<Arc<dyn Tool>>, timeout: Duration) -> ToolRunner {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(tool);
        }
        ToolRunner::new(Arc::new(registry), RunnerConfig::new(timeout))
    }

    #[test]
    fn test_runner_config() {
        let config =
            RunnerConfig::new(Duration::from_secs(60)).with_max_timeout(Duration::from_secs(90));

        assert_eq!(config.default_timeout, Duration::from_secs(60));
        assert_eq!(config.max_timeout, Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let runner = runner_with(Vec::new(), Duration::from_secs(1));
        let result = runner.execute("missing", serde_json::json!({})).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_an_error() {
        let runner = runner_with(
            vec![Arc::new(SlowTool {
                definition: ToolDefinition::new("slow", "Sleeps"),
                delay: Duration::from_secs(10),
            })],
            Duration::from_millis(50),
        );

        let result = runner.execute("slow", serde_json::json!({})).await;
        assert!(matches!(result, Err(Error::Timeout(50))));
    }

    #[tokio::test]
    async fn test_tool_error_becomes_failed_result() {
        let runner = runner_with(
            vec![Arc::new(FailingTool {
                definition: ToolDefinition::new("flaky", "Fails").with_specialist("Flaky"),
            })],
            Duration::from_secs(1),
        );

        let execution = runner.execute("flaky", serde_json::json!({})).await.unwrap();
        assert!(!execution.result.success);
        assert_eq!(execution.specialist, "Flaky");
        assert!(execution
            .result
            .error
            .unwrap()
            .contains("provider unavailable"));
    }

    #[tokio::test]
    async fn test_disabled_tool_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SlowTool {
            definition: ToolDefinition::new("slow", "Sleeps"),
            delay: Duration::from_millis(1),
        }));
        registry.disable("slow");
        let runner = ToolRunner::with_defaults(Arc::new(registry));

        let result = runner.execute("slow", serde_json::json!({})).await;
        assert!(matches!(result, Err(Error::Disabled(_))));
    }
}
