//! Intent classification
//!
//! A classifier turns the query text (plus conversation context) into a
//! [`Classification`]; [`normalize`] then applies the routing rules that
//! hold no matter which classifier produced it.

mod destinations;
mod keyword;
mod llm;

pub use destinations::{destination_key, extract_destinations, latest_destination};
pub use keyword::KeywordClassifier;
pub use llm::LlmClassifier;

use crate::query::ConversationContext;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Book, pay, see prices or packages
    Purchase,
    /// Learn about a destination
    Informational,
    /// Travel interest without a destination
    Vague,
    /// Not about travel
    Unrelated,
}

impl Intent {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Informational => "informational",
            Self::Vague => "vague",
            Self::Unrelated => "unrelated",
        }
    }

    /// Parse the lowercase name
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "purchase" => Some(Self::Purchase),
            "informational" => Some(Self::Informational),
            "vague" => Some(Self::Vague),
            "unrelated" => Some(Self::Unrelated),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intent plus the destinations named, in query order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Intent
    pub intent: Intent,
    /// Destinations
    pub destinations: Vec<String>,
}

impl Classification {
    /// Create a classification
    #[must_use]
    pub fn new(intent: Intent, destinations: Vec<String>) -> Self {
        Self {
            intent,
            destinations,
        }
    }
}

/// Classifies a query
#[async_trait::async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classifier name for logs and traces
    fn name(&self) -> &str;

    /// Classify the query text in its conversation
    async fn classify(&self, text: &str, context: &ConversationContext) -> Classification;
}

/// Apply the routing rules to a raw classification:
///
/// 1. destinations are deduplicated by [`destination_key`] (case and
///    accents ignored), first one wins;
/// 2. purchase or informational queries that name no destination take the
///    most recent destination from the conversation;
/// 3. purchase or informational without any destination becomes vague;
/// 4. vague or unrelated queries that do name a destination become
///    informational.
#[must_use]
pub fn normalize(raw: Classification, context: &ConversationContext) -> Classification {
    let mut seen = Vec::new();
    let mut destinations = Vec::new();
    for destination in raw.destinations {
        let trimmed = destination.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = destination_key(trimmed);
        if !seen.contains(&key) {
            seen.push(key);
            destinations.push(trimmed.to_string());
        }
    }

    let mut intent = raw.intent;
    let wants_destination = matches!(intent, Intent::Purchase | Intent::Informational);

    if wants_destination && destinations.is_empty() {
        if let Some(previous) = latest_destination(context) {
            destinations.push(previous);
        } else {
            intent = Intent::Vague;
        }
    }

    if matches!(intent, Intent::Vague | Intent::Unrelated) && !destinations.is_empty() {
        intent = Intent::Informational;
    }

    Classification::new(intent, destinations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::HistoryEntry;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_intent_parse() {
        assert_eq!(Intent::parse(" Purchase "), Some(Intent::Purchase));
        assert_eq!(Intent::parse("other"), None);
        assert_eq!(Intent::Vague.to_string(), "vague");
    }

    #[test]
    fn test_normalize_dedupes_case_insensitively() {
        let raw = Classification::new(Intent::Purchase, names(&["Roma", "París", "roma", " ROMA "]));
        let normalized = normalize(raw, &ConversationContext::default());
        assert_eq!(normalized.destinations, names(&["Roma", "París"]));
        assert_eq!(normalized.intent, Intent::Purchase);
    }

    #[test]
    fn test_normalize_folds_accents() {
        let raw = Classification::new(Intent::Purchase, names(&["Paris", "París", "PARIS"]));
        let normalized = normalize(raw, &ConversationContext::default());
        assert_eq!(normalized.destinations, names(&["Paris"]));
    }

    #[test]
    fn test_purchase_without_destination_is_vague() {
        let normalized = normalize(
            Classification::new(Intent::Purchase, Vec::new()),
            &ConversationContext::default(),
        );
        assert_eq!(normalized.intent, Intent::Vague);
        assert!(normalized.destinations.is_empty());
    }

    #[test]
    fn test_destination_without_purchase_is_informational() {
        for intent in [Intent::Vague, Intent::Unrelated] {
            let normalized = normalize(
                Classification::new(intent, names(&["Bali"])),
                &ConversationContext::default(),
            );
            assert_eq!(normalized.intent, Intent::Informational);
        }
    }

    #[test]
    fn test_purchase_takes_destination_from_history() {
        let context = ConversationContext::from_history(&[
            HistoryEntry::new("user", "Háblame de Tokio"),
            HistoryEntry::new("assistant", "Tokio es fascinante. ¿Y qué tal Kioto?"),
        ]);
        let normalized = normalize(Classification::new(Intent::Purchase, Vec::new()), &context);
        assert_eq!(normalized.intent, Intent::Purchase);
        assert_eq!(normalized.destinations, names(&["Kioto"]));
    }

    #[test]
    fn test_unrelated_stays_unrelated() {
        let normalized = normalize(
            Classification::new(Intent::Unrelated, Vec::new()),
            &ConversationContext::default(),
        );
        assert_eq!(normalized, Classification::new(Intent::Unrelated, Vec::new()));
    }
}
