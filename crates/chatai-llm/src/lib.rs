//! ChatAI LLM - streaming OpenAI client
//!
//! This crate provides:
//! - A streaming client for the OpenAI Responses API
//! - Chat message types shared with the HTTP relay
//! - A deterministic mock client for tests

pub mod error;
mod http_client;
pub mod llm;

// Re-export commonly used types
pub use error::{LlmError, Result};
pub use llm::{
    CompletionRequest, DeltaStream, FinishReason, LlmClient, Message, MockLlmClient, OpenAIClient,
    Role, StreamChunk,
};
