//! Deterministic mock LLM client for relay tests.

use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{LlmError, Result};

use super::{CompletionRequest, DeltaStream, FinishReason, LlmClient, StreamChunk};

/// A deterministic mock LLM client.
///
/// Every call replays the same scripted deltas, so repeated or concurrent
/// requests see independent identical streams. Each request received is
/// captured for assertions.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    model: String,
    deltas: Vec<String>,
    fail_before_stream: Option<String>,
    fail_mid_stream: Option<String>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Script the text deltas each stream yields, in order.
    pub fn with_deltas(mut self, deltas: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.deltas = deltas.into_iter().map(Into::into).collect();
        self
    }

    /// Fail every call before any delta is produced.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_before_stream = Some(message.into());
        self
    }

    /// Fail every stream after the scripted deltas have been yielded.
    pub fn with_mid_stream_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_mid_stream = Some(message.into());
        self
    }

    /// Requests captured so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<DeltaStream> {
        self.requests.lock().await.push(request);

        if let Some(message) = &self.fail_before_stream {
            return Err(LlmError::Llm(message.clone()));
        }

        let deltas = self.deltas.clone();
        let mid_stream_failure = self.fail_mid_stream.clone();

        Ok(Box::pin(try_stream! {
            for delta in deltas {
                yield StreamChunk::text(delta);
            }

            if let Some(message) = mid_stream_failure {
                Err(LlmError::Llm(message))?;
            }

            yield StreamChunk::final_chunk(FinishReason::Stop);
        }))
    }
}
