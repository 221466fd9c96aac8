//! Gateway configuration, loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

pub struct GatewayConfig {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub ai_model: String,
    pub llm_timeout_secs: u64,
    pub idle_timeout_minutes: i64,
    pub bind_addr: String,
    pub log_file: String,
}

impl GatewayConfig {
    /// Loads configuration from the environment. If `bind` is provided it
    /// overrides BIND_ADDR.
    pub fn load(bind: Option<String>) -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "./botify.db".to_string());
        let openai_api_key =
            env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let openai_base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let ai_model = env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let llm_timeout_secs = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(llm_client::DEFAULT_REQUEST_TIMEOUT_SECS);
        let idle_timeout_minutes = env::var("IDLE_TIMEOUT_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        let bind_addr = bind
            .or_else(|| env::var("BIND_ADDR").ok())
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/botify-gateway.log".to_string());

        Ok(Self {
            database_url,
            openai_api_key,
            openai_base_url,
            ai_model,
            llm_timeout_secs,
            idle_timeout_minutes,
            bind_addr,
            log_file,
        })
    }
}
