//! LLM module - streaming client abstraction

mod client;
mod mock_client;
mod openai;

pub use client::{
    CompletionRequest, DeltaStream, FinishReason, LlmClient, Message, Role, StreamChunk,
};
pub use mock_client::MockLlmClient;
pub use openai::OpenAIClient;
