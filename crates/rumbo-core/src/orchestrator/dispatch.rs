//! Specialist calls

use crate::trace::{InvocationOutput, OrchestrationTrace, ToolInvocation};
use rumbo_tools::SpecialistOutput;
use std::time::Instant;
use tracing::{info, warn};

use super::core::Orchestrator;
use super::routing::DispatchStep;

impl Orchestrator {
    /// Run one step through the tool runner and append the call to the trace.
    ///
    /// Failures of any kind (provider error, timeout, unknown tool) are
    /// recorded on the invocation and never abort the request.
    pub(crate) async fn invoke(
        &self,
        trace: &mut OrchestrationTrace,
        step: DispatchStep,
        destination: Option<&str>,
        input: serde_json::Value,
    ) {
        let tool_name = step.tool_name();
        let input_text = input.to_string();
        info!(tool = %tool_name, destination = ?destination, "Calling specialist");

        let start = Instant::now();
        let result = self.runner.execute(tool_name, input).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (specialist, output, error) = match result {
            Ok(execution) if execution.result.success => (
                execution.specialist,
                parse_output(execution.result.output),
                None,
            ),
            Ok(execution) => (
                execution.specialist,
                InvocationOutput::None,
                Some(
                    execution
                        .result
                        .error
                        .unwrap_or_else(|| "specialist reported a failure".to_string()),
                ),
            ),
            Err(e) => (self.specialist_name(tool_name), InvocationOutput::None, Some(e.to_string())),
        };

        match &error {
            Some(error) => warn!(
                tool = %tool_name,
                destination = ?destination,
                duration_ms,
                error = %error,
                "Specialist call failed"
            ),
            None => info!(tool = %tool_name, destination = ?destination, duration_ms, "Specialist call succeeded"),
        }

        trace.push_invocation(ToolInvocation {
            sequence: 0,
            tool_name: tool_name.to_string(),
            specialist,
            destination: destination.map(str::to_string),
            input: input_text,
            output,
            error,
            duration_ms,
        });
    }

    fn specialist_name(&self, tool_name: &str) -> String {
        self.runner
            .registry()
            .get_definition(tool_name)
            .map(|definition| definition.specialist.clone())
            .unwrap_or_else(|| tool_name.to_string())
    }
}

/// Typed output when the payload matches a known shape, text otherwise
pub(crate) fn parse_output(value: serde_json::Value) -> InvocationOutput {
    match value {
        serde_json::Value::Null => InvocationOutput::None,
        serde_json::Value::String(text) => InvocationOutput::Text(text),
        other => match serde_json::from_value::<SpecialistOutput>(other.clone()) {
            Ok(output) => InvocationOutput::Structured(output),
            Err(_) => InvocationOutput::Text(other.to_string()),
        },
    }
}
