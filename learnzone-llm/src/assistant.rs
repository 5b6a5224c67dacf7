//! The hosted-model collaborator seam.
//!
//! [`AssistantBackend`] is the black box an [`crate::AssistantSession`]
//! talks to. [`HostedAssistant`] is the production implementation over
//! [`LlmClient`]; tests substitute their own.

use async_trait::async_trait;
use tracing::debug;

use crate::client::LlmClient;
use crate::config::{AssistantConfig, LlmConfig, ProviderConfig};
use crate::error::Result;
use crate::types::{ConversationMode, HistoryTurn, LlmRequest};

/// The two operations the assistant panel consumes.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Programming help, continuing the given history (oldest first).
    ///
    /// # Errors
    /// Any transport or provider failure.
    async fn code_help(&self, prompt: &str, history: &[HistoryTurn]) -> Result<String>;

    /// Platform help. Each query is answered on its own.
    ///
    /// # Errors
    /// Any transport or provider failure.
    async fn platform_help(&self, prompt: &str) -> Result<String>;
}

/// [`AssistantBackend`] backed by a hosted model.
///
/// Without credentials both operations succeed with the configured
/// "service unavailable" text; this is a permanent state, not an error.
#[derive(Debug)]
pub struct HostedAssistant {
    client: LlmClient,
    provider: ProviderConfig,
    assistant: AssistantConfig,
}

impl HostedAssistant {
    /// Build from configuration.
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        Self::with_client(config.client(), config)
    }

    /// Build around an existing client.
    #[must_use]
    pub fn with_client(client: LlmClient, config: &LlmConfig) -> Self {
        Self {
            client,
            provider: config.llm.clone(),
            assistant: config.assistant.clone(),
        }
    }

    /// Whether a provider is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.client.is_available()
    }

    fn request(&self, mode: ConversationMode, prompt: &str) -> LlmRequest {
        let mut request = LlmRequest::new(self.assistant.system_prompt(mode), prompt)
            .with_timeout(self.provider.request_timeout_ms);
        request.temperature = self.provider.temperature;
        request.max_tokens = self.provider.max_tokens;
        request
    }

    async fn ask(&self, mode: ConversationMode, request: LlmRequest) -> Result<String> {
        if !self.client.is_available() {
            debug!(%mode, "No assistant credentials; returning unavailable message");
            return Ok(self.assistant.unavailable_message(mode).to_string());
        }
        let response = self.client.generate(&request).await?;
        debug!(
            model = %response.model,
            latency_ms = response.latency_ms,
            tokens = response.tokens_generated,
            "Assistant replied"
        );
        Ok(response.text)
    }
}

#[async_trait]
impl AssistantBackend for HostedAssistant {
    async fn code_help(&self, prompt: &str, history: &[HistoryTurn]) -> Result<String> {
        let request = self
            .request(ConversationMode::Code, prompt)
            .with_history(history.to_vec());
        self.ask(ConversationMode::Code, request).await
    }

    async fn platform_help(&self, prompt: &str) -> Result<String> {
        let request = self.request(ConversationMode::Platform, prompt);
        self.ask(ConversationMode::Platform, request).await
    }
}
