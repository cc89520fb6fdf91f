//! Query - incoming requests and conversation context

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One prior message of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Speaker, e.g. `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
}

impl HistoryEntry {
    /// Create an entry
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// A user request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Request text
    pub text: String,
    /// Prior messages, oldest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Caller-supplied conversation id, echoed back
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl Query {
    /// Create a query without history
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            history: Vec::new(),
            conversation_id: None,
        }
    }

    /// Set the history
    #[must_use]
    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    /// Set the conversation id
    #[must_use]
    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    /// Check the text is not blank and every history entry has a role.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::Validation("query must not be empty".to_string()));
        }
        if let Some(index) = self
            .history
            .iter()
            .position(|entry| entry.role.trim().is_empty())
        {
            return Err(Error::Validation(format!(
                "history[{}].role must not be empty",
                index
            )));
        }
        Ok(())
    }
}

/// Transcript of prior messages, one `role: content` line per entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    entries: Vec<HistoryEntry>,
}

impl ConversationContext {
    /// Build the context from history, folding line breaks inside messages
    #[must_use]
    pub fn from_history(history: &[HistoryEntry]) -> Self {
        let entries = history
            .iter()
            .map(|entry| HistoryEntry {
                role: entry.role.trim().to_string(),
                content: fold_lines(&entry.content),
            })
            .collect();
        Self { entries }
    }

    /// Whether there is no history
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, oldest first
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// `role: content` lines, oldest first
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .map(|entry| format!("{}: {}", entry.role, entry.content))
    }

    /// The transcript; empty string when there is no history
    #[must_use]
    pub fn transcript(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }

    /// The transcript under a `Previous conversation:` header, for prompts
    #[must_use]
    pub fn instructions(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("Previous conversation:\n{}", self.transcript())
        }
    }
}

fn fold_lines(content: &str) -> String {
    content
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(Query::new("quiero viajar").validate().is_ok());
        assert!(Query::new("   ").validate().unwrap_err().is_validation());

        let query = Query::new("hola").with_history(vec![
            HistoryEntry::new("user", "hola"),
            HistoryEntry::new(" ", "sin rol"),
        ]);
        let err = query.validate().unwrap_err();
        assert!(err.to_string().contains("history[1].role"));
    }

    #[test]
    fn test_empty_content_is_allowed() {
        let query = Query::new("hola").with_history(vec![HistoryEntry::new("assistant", "")]);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_context_has_one_line_per_entry() {
        let history = vec![
            HistoryEntry::new("user", "Quiero ir a Roma"),
            HistoryEntry::new("assistant", "¡Genial!\nRoma es\r\nincreíble"),
            HistoryEntry::new("user", ""),
        ];
        let context = ConversationContext::from_history(&history);

        let lines: Vec<String> = context.lines().collect();
        assert_eq!(
            lines,
            vec![
                "user: Quiero ir a Roma".to_string(),
                "assistant: ¡Genial! Roma es increíble".to_string(),
                "user: ".to_string(),
            ]
        );
        assert_eq!(context.transcript().lines().count(), 3);
        assert!(context.instructions().starts_with("Previous conversation:\n"));
    }

    #[test]
    fn test_empty_context() {
        let context = ConversationContext::from_history(&[]);
        assert!(context.is_empty());
        assert_eq!(context.transcript(), "");
        assert_eq!(context.instructions(), "");
    }

    #[test]
    fn test_query_deserialization_defaults() {
        let query: Query = serde_json::from_str(r#"{"text": "hola"}"#).unwrap();
        assert!(query.history.is_empty());
        assert!(query.conversation_id.is_none());
    }
}
