//! Request handler - validation, tracing and the top-level error policy

use crate::error::{Error, Result};
use crate::orchestrator::Orchestrator;
use crate::query::{ConversationContext, Query};
use crate::synthesizer::Synthesizer;
use crate::trace::TraceId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

/// Reply to one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Reply text (Markdown with HTML payment buttons)
    pub response: String,
    /// Trace id of the request
    pub trace_id: String,
    /// Conversation id echoed from the query
    pub conversation_id: Option<String>,
}

/// Runs a query through the orchestrator and the synthesizer
#[derive(Clone)]
pub struct RequestHandler {
    orchestrator: Arc<Orchestrator>,
    synthesizer: Synthesizer,
}

impl RequestHandler {
    /// Create a handler
    #[must_use]
    pub fn new(orchestrator: Arc<Orchestrator>, synthesizer: Synthesizer) -> Self {
        Self {
            orchestrator,
            synthesizer,
        }
    }

    /// Handle one query.
    ///
    /// # Errors
    /// - [`Error::Validation`] when the query is malformed
    /// - [`Error::AllProvidersFailed`] when every specialist call failed and
    ///   no LLM answered the query directly
    pub async fn handle(&self, query: Query) -> Result<Response> {
        query.validate()?;

        let trace_id = TraceId::generate();
        let span = info_span!(
            "request",
            trace_id = %trace_id,
            conversation_id = query.conversation_id.as_deref().unwrap_or("")
        );

        async move {
            let context = ConversationContext::from_history(&query.history);
            info!(history = context.entries().len(), "Handling query");

            let trace = self
                .orchestrator
                .run(&query, &context, trace_id.clone())
                .await;

            let synthesis = self.synthesizer.synthesize(&trace, &query, &context).await;

            let attempted = trace.invocation_count();
            if attempted > 0 && !trace.any_succeeded() && !synthesis.answered_by_llm {
                error!(
                    attempted,
                    llm_configured = self.synthesizer.has_llm(),
                    "Every specialist call failed and no direct answer was produced"
                );
                return Err(Error::AllProvidersFailed {
                    trace_id: trace_id.to_string(),
                    attempted,
                });
            }
            info!(chars = synthesis.text.chars().count(), "Query answered");

            Ok(Response {
                response: synthesis.text,
                trace_id: trace_id.to_string(),
                conversation_id: query.conversation_id,
            })
        }
        .instrument(span)
        .await
    }
}
