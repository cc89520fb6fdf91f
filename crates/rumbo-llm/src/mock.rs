//! Mock LLM Provider for testing
//!
//! Replies are served from a FIFO queue; when the queue is empty the
//! provider answers with a fixed default text.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum MockReply {
    Text(String),
    Failure(String),
}

/// A mock LLM provider that returns queued responses or a default one.
#[derive(Clone)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    default_reply: String,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            default_reply: "mock response".to_string(),
        }
    }

    /// Replace the reply used once the queue is drained.
    #[must_use]
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Queue a successful text reply.
    pub fn push_text(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(MockReply::Text(text.into()));
    }

    /// Queue a failing reply.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(MockReply::Failure(message.into()));
    }

    /// Requests received so far, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match reply {
            Some(MockReply::Text(text)) => Ok(CompletionResponse::text(text, "mock-model")),
            Some(MockReply::Failure(message)) => Err(Error::Api(message)),
            None => Ok(CompletionResponse::text(&self.default_reply, "mock-model")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[tokio::test]
    async fn test_queued_replies_in_order() {
        let provider = MockProvider::new();
        provider.push_text("first");
        provider.push_failure("boom");

        let request = CompletionRequest::new("").with_message(Message::user("hola"));
        let first = provider.complete(request.clone()).await.unwrap();
        assert_eq!(first.content, "first");

        let second = provider.complete(request.clone()).await;
        assert!(matches!(second, Err(Error::Api(msg)) if msg == "boom"));

        let third = provider.complete(request).await.unwrap();
        assert_eq!(third.content, "mock response");
        assert_eq!(provider.requests().len(), 3);
    }
}
