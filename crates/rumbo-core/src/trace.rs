//! Trace - the ordered record of one request's orchestration

use crate::intent::Classification;
use rumbo_tools::SpecialistOutput;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request trace identifier, `trace_` followed by 32 hex digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a fresh random id
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("trace_{}", uuid::Uuid::new_v4().simple()))
    }

    /// The id as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a specialist returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InvocationOutput {
    /// Typed specialist output
    Structured(SpecialistOutput),
    /// Output that did not match any known shape
    Text(String),
    /// Nothing (failed calls)
    None,
}

/// One specialist call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Position among the request's invocations, starting at 1
    pub sequence: usize,
    /// Registry name of the tool
    pub tool_name: String,
    /// Specialist display name
    pub specialist: String,
    /// Destination the call was about
    pub destination: Option<String>,
    /// Serialized tool input
    pub input: String,
    /// Output
    pub output: InvocationOutput,
    /// Error message when the call failed
    pub error: Option<String>,
    /// Wall time
    pub duration_ms: u64,
}

impl ToolInvocation {
    /// Whether the call succeeded
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// The typed output of a successful call
    #[must_use]
    pub fn structured(&self) -> Option<&SpecialistOutput> {
        match &self.output {
            InvocationOutput::Structured(output) if self.succeeded() => Some(output),
            _ => None,
        }
    }
}

/// Entry of an [`OrchestrationTrace`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum TraceEntry {
    /// Orchestrator note (classification, skipped calls)
    Message {
        /// Note text
        text: String,
    },
    /// Specialist call
    Invocation(ToolInvocation),
}

/// Append-only record of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationTrace {
    trace_id: TraceId,
    classification: Classification,
    entries: Vec<TraceEntry>,
}

impl OrchestrationTrace {
    /// Start an empty trace
    #[must_use]
    pub fn new(trace_id: TraceId, classification: Classification) -> Self {
        Self {
            trace_id,
            classification,
            entries: Vec::new(),
        }
    }

    /// Trace id
    #[must_use]
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Normalized classification the dispatch followed
    #[must_use]
    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// All entries in order
    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Append an orchestrator note
    pub fn push_message(&mut self, text: impl Into<String>) {
        self.entries.push(TraceEntry::Message { text: text.into() });
    }

    /// Append an invocation; its sequence number is assigned here
    pub fn push_invocation(&mut self, mut invocation: ToolInvocation) {
        invocation.sequence = self.invocation_count() + 1;
        self.entries.push(TraceEntry::Invocation(invocation));
    }

    /// Invocations in call order
    pub fn invocations(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.entries.iter().filter_map(|entry| match entry {
            TraceEntry::Invocation(invocation) => Some(invocation),
            TraceEntry::Message { .. } => None,
        })
    }

    /// Orchestrator notes in order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            TraceEntry::Message { text } => Some(text.as_str()),
            TraceEntry::Invocation(_) => None,
        })
    }

    /// Number of invocations
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        self.invocations().count()
    }

    /// Whether at least one invocation succeeded
    #[must_use]
    pub fn any_succeeded(&self) -> bool {
        self.invocations().any(ToolInvocation::succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;

    fn invocation(tool: &str, error: Option<&str>) -> ToolInvocation {
        ToolInvocation {
            sequence: 0,
            tool_name: tool.to_string(),
            specialist: tool.to_string(),
            destination: Some("Roma".to_string()),
            input: "{}".to_string(),
            output: InvocationOutput::None,
            error: error.map(str::to_string),
            duration_ms: 3,
        }
    }

    #[test]
    fn test_trace_id_format() {
        let id = TraceId::generate();
        let hex = id.as_str().strip_prefix("trace_").unwrap();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, TraceId::generate());
    }

    #[test]
    fn test_sequences_follow_invocation_order() {
        let mut trace = OrchestrationTrace::new(
            TraceId::generate(),
            Classification::new(Intent::Purchase, vec!["Roma".to_string()]),
        );
        trace.push_message("intent=purchase");
        trace.push_invocation(invocation("create_travel_products", Some("boom")));
        trace.push_invocation(invocation("get_destination_info", None));

        let sequences: Vec<usize> = trace.invocations().map(|i| i.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert_eq!(trace.entries().len(), 3);
        assert_eq!(trace.messages().collect::<Vec<_>>(), vec!["intent=purchase"]);
        assert!(trace.any_succeeded());
    }

    #[test]
    fn test_failed_invocation_has_no_structured_output() {
        let failed = invocation("create_travel_products", Some("timeout after 50ms"));
        assert!(!failed.succeeded());
        assert!(failed.structured().is_none());
    }
}
