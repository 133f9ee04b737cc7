//! OpenAI LLM provider

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result, response_to_error};
use crate::http_client::build_http_client;
use crate::llm::client::{
    CompletionRequest, DeltaStream, FinishReason, LlmClient, Role, StreamChunk,
};

/// OpenAI client
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            api_key: api_key.into(),
            model: "gpt-4.1-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set custom base URL (for API-compatible services)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Serialize)]
struct InputMessage {
    role: String,
    content: String,
}

// Streaming types

/// Responses API SSE event types. Only text deltas carry payload worth
/// relaying; the rest either terminate the stream or are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponsesStreamEvent {
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta { delta: String },
    #[serde(rename = "response.completed")]
    Completed,
    #[serde(rename = "response.incomplete")]
    Incomplete,
    #[serde(rename = "response.failed")]
    Failed,
    #[serde(rename = "error")]
    Error { message: Option<String> },
    #[serde(other)]
    Other,
}

#[async_trait]
impl LlmClient for OpenAIClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<DeltaStream> {
        let input: Vec<InputMessage> = request
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                }
                .to_string();

                InputMessage {
                    role,
                    content: m.content.clone(),
                }
            })
            .collect();

        let body = ResponsesRequest {
            model: self.model.clone(),
            input,
            stream: true,
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        };

        tracing::debug!(model = %self.model, "opening streaming completion");

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(response_to_error(response, "OpenAI").await);
        }

        Ok(Box::pin(async_stream::stream! {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(LlmError::Llm(format!("Stream error: {}", e)));
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // Process complete SSE events from buffer
                while let Some(pos) = buffer.find("\n\n") {
                    let event_str = buffer[..pos].to_string();
                    buffer = buffer[pos + 2..].to_string();

                    for line in event_str.lines() {
                        if let Some(data) = line.strip_prefix("data: ") {
                            if data.trim().is_empty() {
                                continue;
                            }

                            let event: ResponsesStreamEvent = match serde_json::from_str(data) {
                                Ok(e) => e,
                                Err(_) => continue,
                            };

                            match event {
                                ResponsesStreamEvent::OutputTextDelta { delta } => {
                                    if !delta.is_empty() {
                                        yield Ok(StreamChunk::text(delta));
                                    }
                                }
                                ResponsesStreamEvent::Completed => {
                                    yield Ok(StreamChunk::final_chunk(FinishReason::Stop));
                                }
                                ResponsesStreamEvent::Incomplete => {
                                    yield Ok(StreamChunk::final_chunk(FinishReason::MaxTokens));
                                }
                                ResponsesStreamEvent::Failed => {
                                    yield Err(LlmError::Llm("OpenAI response failed".to_string()));
                                    return;
                                }
                                ResponsesStreamEvent::Error { message } => {
                                    yield Err(LlmError::Llm(
                                        message.unwrap_or_else(|| "OpenAI stream error".to_string()),
                                    ));
                                    return;
                                }
                                ResponsesStreamEvent::Other => {}
                            }
                        }
                    }
                }
            }

            // Process any remaining data in the buffer after the stream ends.
            // This handles a final delta event that lacks its trailing \n\n
            // (e.g. due to a network interruption).
            let remaining = buffer.trim();
            if !remaining.is_empty() {
                for line in remaining.lines() {
                    if let Some(data) = line.strip_prefix("data: ")
                        && let Ok(ResponsesStreamEvent::OutputTextDelta { delta }) =
                            serde_json::from_str(data)
                        && !delta.is_empty()
                    {
                        yield Ok(StreamChunk::text(delta));
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::llm::client::Message;

    fn sse(events: &[&str]) -> String {
        events
            .iter()
            .map(|data| format!("data: {}\n\n", data))
            .collect()
    }

    fn sse_response(body: String) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
    }

    #[tokio::test]
    async fn streams_text_deltas_in_order() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"{"type":"response.created"}"#,
            r#"{"type":"response.output_text.delta","delta":"Hello"}"#,
            r#"{"type":"response.output_text.delta","delta":" world"}"#,
            r#"{"type":"response.completed"}"#,
        ]);
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(sse_response(body))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("test-key").with_base_url(server.uri());
        let chunks: Vec<StreamChunk> = client
            .complete_stream(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .expect("stream should open")
            .try_collect()
            .await
            .expect("stream should succeed");

        let texts: Vec<&str> = chunks
            .iter()
            .filter(|c| !c.text.is_empty())
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Hello", " world"]);
        assert_eq!(
            chunks.last().and_then(|c| c.finish_reason),
            Some(FinishReason::Stop)
        );
    }

    #[tokio::test]
    async fn request_carries_model_messages_and_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4.1-mini",
                "stream": true,
                "input": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"},
                ],
            })))
            .respond_with(sse_response(sse(&[r#"{"type":"response.completed"}"#])))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAIClient::new("test-key").with_base_url(server.uri());
        let request =
            CompletionRequest::new(vec![Message::system("be brief"), Message::user("hi")]);
        let chunks: Vec<StreamChunk> = client
            .complete_stream(request)
            .await
            .expect("stream should open")
            .try_collect()
            .await
            .expect("stream should succeed");

        assert_eq!(
            chunks.last().and_then(|c| c.finish_reason),
            Some(FinishReason::Stop)
        );
    }

    #[tokio::test]
    async fn rejected_request_fails_before_any_delta() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("bad-key").with_base_url(server.uri());
        let result = client
            .complete_stream(CompletionRequest::new(vec![Message::user("hi")]))
            .await;

        match result {
            Err(LlmError::Provider { status, .. }) => assert_eq!(status, 401),
            other => panic!("expected provider error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn ignores_unknown_events_and_malformed_payloads() {
        let server = MockServer::start().await;
        let body = format!(
            "{}data: not-json\n\n{}",
            sse(&[
                r#"{"type":"response.output_item.added"}"#,
                r#"{"type":"response.output_text.delta","delta":"ok"}"#,
            ]),
            sse(&[r#"{"type":"response.completed"}"#]),
        );
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(sse_response(body))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("test-key").with_base_url(server.uri());
        let chunks: Vec<StreamChunk> = client
            .complete_stream(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .expect("stream should open")
            .try_collect()
            .await
            .expect("stream should succeed");

        let texts: Vec<&str> = chunks
            .iter()
            .filter(|c| !c.text.is_empty())
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(texts, vec!["ok"]);
    }

    #[tokio::test]
    async fn recovers_trailing_delta_without_event_terminator() {
        let server = MockServer::start().await;
        let body = format!(
            "{}data: {}",
            sse(&[r#"{"type":"response.output_text.delta","delta":"first"}"#]),
            r#"{"type":"response.output_text.delta","delta":" last"}"#,
        );
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(sse_response(body))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("test-key").with_base_url(server.uri());
        let chunks: Vec<StreamChunk> = client
            .complete_stream(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .expect("stream should open")
            .try_collect()
            .await
            .expect("stream should succeed");

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", " last"]);
    }
}
