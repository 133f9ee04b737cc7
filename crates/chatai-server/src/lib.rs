//! ChatAI server - relays chat requests to the model provider and streams
//! the generated text back to the browser.

pub mod api;
pub mod config;
pub mod state;
pub mod static_assets;

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> axum::Json<Health> {
    axum::Json(Health {
        status: "chatai is working!".to_string(),
    })
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/chat-stream", post(api::chat::chat_stream))
        .fallback(static_assets::static_handler)
        .layer(cors)
        .with_state(state)
}
