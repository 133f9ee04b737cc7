//! The chat relay endpoint.

use std::convert::Infallible;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chatai_llm::{CompletionRequest, Message, Role};
use futures::StreamExt;
use serde::Deserialize;

use crate::api::ApiError;
use crate::state::AppState;

/// Only the most recent turns are forwarded to the provider.
const MAX_HISTORY_TURNS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

/// One prior turn as supplied by the browser. Missing fields deserialize to
/// empty strings; roles are normalized during assembly.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Assemble the provider message list: one system turn, the bounded and
/// normalized history in original order, then the current message as the
/// final user turn.
fn build_messages(system_prompt: &str, history: &[HistoryTurn], message: &str) -> Vec<Message> {
    let recent = &history[history.len().saturating_sub(MAX_HISTORY_TURNS)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(Message::system(system_prompt));
    for turn in recent {
        messages.push(Message {
            role: Role::normalize(&turn.role),
            content: turn.content.clone(),
        });
    }
    messages.push(Message::user(message));
    messages
}

// POST /chat-stream
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let messages = build_messages(&state.system_prompt, &request.history, &request.message);
    tracing::debug!(messages = messages.len(), "opening provider stream");

    let mut deltas = state
        .llm
        .complete_stream(CompletionRequest::new(messages))
        .await?;

    let body = async_stream::stream! {
        while let Some(chunk) = deltas.next().await {
            match chunk {
                Ok(chunk) if !chunk.text.is_empty() => {
                    yield Ok::<Bytes, Infallible>(Bytes::from(chunk.text));
                }
                Ok(_) => {}
                Err(err) => {
                    // Text already relayed stands; the truncated body is the
                    // client's failure signal.
                    tracing::warn!(error = %err, "provider stream ended early");
                    break;
                }
            }
        }
    };

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response())
}
