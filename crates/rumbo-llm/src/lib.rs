//! Rumbo LLM - LLM Provider Abstraction
//!
//! This crate provides the language-model seam used by the travel assistant:
//! - Provider: the `LlmProvider` trait every backend implements
//! - OpenAI: chat completions through async-openai
//! - Mock: queued responses for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod util;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::LlmProvider;
