//! OpenAI-compatible implementation of [`LlmClient`] over async-openai.
//!
//! Every request runs under `tokio::time::timeout`; a hung upstream call can
//! never stall a session past the configured bound.

use std::sync::Arc;
use std::time::Duration;

use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::info;

use crate::{ChatMessage, LlmClient, LlmError, MessageRole};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Masks an API key for safe logging: first 7 chars + "***" + last 4 chars.
/// Keys of length <= 11 become "***" so no part of them leaks.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// Chat client for any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
    model: String,
    timeout: Duration,
    api_key_for_logging: String,
}

impl OpenAiLlmClient {
    pub fn new(api_key: String) -> Self {
        let api_key_for_logging = api_key.clone();
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            api_key_for_logging,
        }
    }

    /// Builds a client against a custom base URL (proxies, compatible
    /// endpoints such as Groq-hosted DeepSeek).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let api_key_for_logging = api_key.clone();
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            api_key_for_logging,
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn to_request_message(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, LlmError> {
        let content = msg.content.clone();
        let request_msg: ChatCompletionRequestMessage = match msg.role {
            MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| LlmError::Api(e.to_string()))?
                .into(),
            MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| LlmError::Api(e.to_string()))?
                .into(),
            MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| LlmError::Api(e.to_string()))?
                .into(),
        };
        Ok(request_msg)
    }
}

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let request_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            model = %self.model,
            message_count = request_messages.len(),
            api_key = %mask_token(&self.api_key_for_logging),
            "LLM completion request"
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .build()
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| LlmError::Api(e.to_string()))?;

        if let Some(ref usage) = response.usage {
            info!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "LLM completion usage"
            );
        }

        match response.choices.first() {
            Some(choice) => Ok(choice.message.content.clone().unwrap_or_default()),
            None => Err(LlmError::EmptyResponse),
        }
    }
}
