//! Error types for the LLM client

use reqwest::Response;
use thiserror::Error;

/// LLM client error types
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("{provider} API error (status {status}): {message}")]
    Provider {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for LLM operations
pub type Result<T> = std::result::Result<T, LlmError>;

pub(crate) async fn response_to_error(response: Response, provider: &str) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    // Truncate error body to prevent leaking large or sensitive responses.
    const MAX_ERROR_BODY: usize = 512;
    let message = if body.len() > MAX_ERROR_BODY {
        format!("{}... [truncated]", &body[..MAX_ERROR_BODY])
    } else {
        body
    };

    LlmError::Provider {
        provider: provider.to_string(),
        status,
        message,
    }
}
