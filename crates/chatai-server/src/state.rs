//! Shared application state

use std::sync::Arc;

use chatai_llm::LlmClient;

/// Process-wide immutable state handed to each request handler.
///
/// The provider client is built once at startup and shared; requests never
/// mutate it.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmClient>,
    pub system_prompt: Arc<str>,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: &str) -> Self {
        Self {
            llm,
            system_prompt: Arc::from(system_prompt),
        }
    }
}
