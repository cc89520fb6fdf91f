//! Synthesizer - merges an orchestration trace into one reply
//!
//! The reply is assembled in a fixed order:
//! 1. a direct answer to the query (LLM when configured, template otherwise)
//! 2. destination information (places or suggestions)
//! 3. commerce offers, introduced by a transition when 2 is present
//! 4. short notes for specialists that failed

mod intro;
mod sections;

use crate::query::{ConversationContext, Query};
use crate::trace::OrchestrationTrace;
use rumbo_llm::LlmProvider;
use std::sync::Arc;
use tracing::debug;

const TRANSITION: &str =
    "¿Te animas a conocerlo en persona? Estas son las opciones para reservar tu viaje:";

const CLOSING: &str = "Una vez que completes la reserva, recibirás todos los detalles de tu \
                       itinerario. ¡Avísame si tienes más preguntas o necesitas algún ajuste! 😊";

/// A finished reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    /// Reply text
    pub text: String,
    /// Whether the opening answer came from the LLM rather than a template
    pub answered_by_llm: bool,
}

/// Turns a trace into the text sent back to the user
#[derive(Clone, Default)]
pub struct Synthesizer {
    llm: Option<Arc<dyn LlmProvider>>,
    model: Option<String>,
}

impl Synthesizer {
    /// Template-only synthesizer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an LLM for the direct answer
    #[must_use]
    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Model for the LLM; the provider default otherwise
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Whether an LLM can answer queries directly
    #[must_use]
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Build the reply for a finished trace
    pub async fn synthesize(
        &self,
        trace: &OrchestrationTrace,
        query: &Query,
        context: &ConversationContext,
    ) -> Synthesis {
        let info = sections::destination_info(trace);
        let offers = sections::offers(trace);

        let (intro, answered_by_llm) = self
            .intro(trace, query, context, info.is_some(), offers.is_some())
            .await;
        let mut parts = vec![intro];

        let has_info = info.is_some();
        if let Some(info) = info {
            parts.push(info);
        }
        if let Some(offers) = offers {
            if has_info {
                parts.push(TRANSITION.to_string());
            }
            parts.push(offers);
            parts.push(CLOSING.to_string());
        }
        if let Some(notes) = sections::limitations(trace) {
            parts.push(notes);
        }

        debug!(
            trace_id = %trace.trace_id(),
            sections = parts.len(),
            answered_by_llm,
            "Reply synthesized"
        );
        Synthesis {
            text: parts.join("\n\n"),
            answered_by_llm,
        }
    }
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("llm", &self.llm.as_ref().map(|llm| llm.name().to_string()))
            .field("model", &self.model)
            .finish()
    }
}
