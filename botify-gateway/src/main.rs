//! botify-gateway: entry point. Wires storage, the LLM client, and the chat
//! engine behind the WebSocket endpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use botify_core::init_tracing;
use botify_gateway::{load_config, router, Cli, Commands, GatewayState};
use chat_engine::SessionManager;
use clap::Parser;
use llm_client::{mask_token, OpenAiLlmClient};
use storage::Stores;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { bind } => {
            let config = load_config(bind)?;
            init_tracing(&config.log_file)?;

            info!(
                database_url = %config.database_url,
                model = %config.ai_model,
                api_key = %mask_token(&config.openai_api_key),
                "Starting botify-gateway"
            );

            let stores = Stores::connect(&config.database_url)
                .await
                .context("Failed to open database")?;

            let llm = OpenAiLlmClient::with_base_url(
                config.openai_api_key.clone(),
                config.openai_base_url.clone(),
            )
            .with_model(config.ai_model.clone())
            .with_timeout(Duration::from_secs(config.llm_timeout_secs));

            let engine = SessionManager::new(stores, Arc::new(llm))
                .with_idle_timeout(config.idle_timeout_minutes);

            let app = router(Arc::new(GatewayState { engine }));

            let listener = tokio::net::TcpListener::bind(&config.bind_addr)
                .await
                .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
            info!(addr = %config.bind_addr, "Listening");

            axum::serve(listener, app).await.context("Server error")?;
            Ok(())
        }
    }
}
