//! LLM-backed classifier with keyword fallback

use super::keyword::KeywordClassifier;
use super::{Classification, Intent, IntentClassifier};
use crate::query::ConversationContext;
use rumbo_llm::{CompletionRequest, LlmProvider, Message};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = r#"You classify messages sent to a travel assistant.
Reply with a single JSON object and nothing else:
{"intent": "purchase" | "informational" | "vague" | "unrelated", "destinations": ["..."]}

- purchase: the user wants to book, pay, or see prices, offers or packages
- informational: the user wants to know about a specific destination
- vague: the user wants to travel but names no destination
- unrelated: the message is not about travel

List every destination the user names, in the order they appear, spelled as
the user wrote them. Use the previous conversation only to resolve references
such as "there" or "that city"."#;

#[derive(Debug, Deserialize)]
struct RawClassification {
    intent: String,
    #[serde(default)]
    destinations: Vec<String>,
}

/// Asks an [`LlmProvider`] to classify the query
///
/// Any provider error or unparseable answer falls back to
/// [`KeywordClassifier`].
pub struct LlmClassifier {
    provider: Arc<dyn LlmProvider>,
    model: String,
    fallback: KeywordClassifier,
}

impl LlmClassifier {
    /// Create a classifier; `None` uses the provider's default model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        Self {
            provider,
            model,
            fallback: KeywordClassifier::new(),
        }
    }

    async fn ask(&self, text: &str, context: &ConversationContext) -> Option<Classification> {
        let mut system = SYSTEM_PROMPT.to_string();
        if !context.is_empty() {
            system.push_str("\n\n");
            system.push_str(&context.instructions());
        }

        let request = CompletionRequest::new(&self.model)
            .with_message(Message::system(system))
            .with_message(Message::user(text))
            .with_max_tokens(150)
            .with_temperature(0.0);

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Intent classification failed");
                return None;
            }
        };

        let parsed = parse_classification(&response.content);
        if parsed.is_none() {
            debug!(content = %response.content, "Unparseable classification");
        }
        parsed
    }
}

#[async_trait::async_trait]
impl IntentClassifier for LlmClassifier {
    fn name(&self) -> &str {
        "llm"
    }

    async fn classify(&self, text: &str, context: &ConversationContext) -> Classification {
        match self.ask(text, context).await {
            Some(classification) => classification,
            None => self.fallback.classify_text(text),
        }
    }
}

/// Extract the JSON object from a model reply, tolerating code fences and
/// surrounding prose
fn parse_classification(content: &str) -> Option<Classification> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    let raw: RawClassification = serde_json::from_str(&content[start..=end]).ok()?;
    let intent = Intent::parse(&raw.intent)?;
    Some(Classification::new(intent, raw.destinations))
}
