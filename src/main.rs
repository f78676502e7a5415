use std::sync::Arc;

use anyhow::Context;
use imagera::{config::Config, gemini::GeminiClient, router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imagera=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let client = GeminiClient::new(&config.gemini_base_url, &config.api_key, config.request_timeout)
        .context("failed to build Gemini client")?;
    let state = AppState::new(Arc::new(client), config.models.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %config.bind_addr,
        face_swap_model = %config.models.face_swap,
        prompt_model = %config.models.prompt_generation,
        "Server running"
    );

    axum::serve(listener, router(state)).await?;

    Ok(())
}
