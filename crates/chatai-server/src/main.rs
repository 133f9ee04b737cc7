use std::sync::Arc;

use chatai_llm::OpenAIClient;
use chatai_server::{config::ServerConfig, router, state::AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chatai_server=debug".into()),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting ChatAI backend server");

    let config = ServerConfig::load().expect("Failed to load server config");
    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");

    let mut client = OpenAIClient::new(api_key).with_model(config.model.clone());
    if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
        client = client.with_base_url(base_url);
    }

    tracing::info!(model = %config.model, "Using OpenAI model");

    let state = AppState::new(Arc::new(client), &config.system_prompt);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");

    tracing::info!("ChatAI running on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .expect("Failed to start server");
}
