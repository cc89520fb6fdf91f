//! Rumbo Core - Travel assistant pipeline
//!
//! A request flows through three stages:
//! - [`orchestrator`]: classify intent and dispatch specialists, recording
//!   every call in an [`OrchestrationTrace`]
//! - [`synthesizer`]: merge the trace into one reply
//! - [`handler`]: validation, trace ids and the top-level error policy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handler;
pub mod intent;
pub mod orchestrator;
pub mod query;
pub mod synthesizer;
pub mod trace;

pub use error::{Error, Result};
pub use handler::{RequestHandler, Response};
pub use intent::{
    Classification, Intent, IntentClassifier, KeywordClassifier, LlmClassifier,
};
pub use orchestrator::{DispatchStep, Orchestrator, OrchestratorConfig, RoutingTable};
pub use query::{ConversationContext, HistoryEntry, Query};
pub use synthesizer::{Synthesis, Synthesizer};
pub use trace::{InvocationOutput, OrchestrationTrace, ToolInvocation, TraceEntry, TraceId};
