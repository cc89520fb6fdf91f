//! Orchestrator core structure and request loop

use crate::intent::{destination_key, normalize, Classification, Intent, IntentClassifier};
use crate::query::{ConversationContext, Query};
use crate::trace::{OrchestrationTrace, TraceId};
use rumbo_tools::{ToolRegistry, ToolRunner};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::config::OrchestratorConfig;
use super::routing::DispatchStep;

/// Classifies a query and calls the specialists its intent routes to
///
/// Holds no per-request state: every [`Orchestrator::run`] builds and
/// returns its own trace.
pub struct Orchestrator {
    pub(crate) runner: ToolRunner,
    pub(crate) classifier: Arc<dyn IntentClassifier>,
    pub(crate) config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator
    #[must_use]
    pub fn new(
        tool_registry: Arc<ToolRegistry>,
        classifier: Arc<dyn IntentClassifier>,
        config: OrchestratorConfig,
    ) -> Self {
        let runner = ToolRunner::new(tool_registry, config.runner_config.clone());
        Self {
            runner,
            classifier,
            config,
        }
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Name of the intent classifier in use
    #[must_use]
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Run one request: classify, normalize, dispatch
    #[instrument(skip_all, fields(trace_id = %trace_id))]
    pub async fn run(
        &self,
        query: &Query,
        context: &ConversationContext,
        trace_id: TraceId,
    ) -> OrchestrationTrace {
        let raw = self.classifier.classify(&query.text, context).await;
        debug!(
            classifier = self.classifier.name(),
            intent = %raw.intent,
            destinations = ?raw.destinations,
            "Raw classification"
        );
        let classification = normalize(raw, context);
        info!(
            intent = %classification.intent,
            destinations = ?classification.destinations,
            "Query classified"
        );

        let mut trace = OrchestrationTrace::new(trace_id, classification.clone());
        trace.push_message(describe(&classification, self.classifier.name()));

        match classification.intent {
            Intent::Unrelated => {
                trace.push_message("not a travel request; no specialists called");
            }
            Intent::Vague => {
                let input = serde_json::json!({
                    "mode": "suggest",
                    "query": query.text,
                    "context": context.transcript(),
                });
                self.invoke(&mut trace, DispatchStep::DestinationInfo, None, input)
                    .await;
            }
            Intent::Purchase | Intent::Informational => {
                let steps = self.config.routing.steps(classification.intent);
                let mut seen: HashSet<(DispatchStep, String)> = HashSet::new();

                for destination in &classification.destinations {
                    for &step in &steps {
                        if !seen.insert((step, destination_key(destination))) {
                            trace.push_message(format!(
                                "skipped {} for {}: already called in this request",
                                step, destination
                            ));
                            continue;
                        }
                        let input = step_input(step, destination, query, context);
                        self.invoke(&mut trace, step, Some(destination.as_str()), input)
                            .await;
                    }
                }
            }
        }

        info!(
            invocations = trace.invocation_count(),
            any_succeeded = trace.any_succeeded(),
            "Orchestration finished"
        );
        trace
    }
}

fn describe(classification: &Classification, classifier: &str) -> String {
    if classification.destinations.is_empty() {
        format!("intent {} ({} classifier)", classification.intent, classifier)
    } else {
        format!(
            "intent {} ({} classifier), destinations: {}",
            classification.intent,
            classifier,
            classification.destinations.join(", ")
        )
    }
}

fn step_input(
    step: DispatchStep,
    destination: &str,
    query: &Query,
    context: &ConversationContext,
) -> serde_json::Value {
    match step {
        DispatchStep::DestinationInfo => serde_json::json!({
            "mode": "details",
            "destination": destination,
            "query": query.text,
            "context": context.transcript(),
        }),
        DispatchStep::Commerce => serde_json::json!({ "destination": destination }),
    }
}
