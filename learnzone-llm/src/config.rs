//! Assistant configuration, loadable from TOML.
//!
//! ```toml
//! [llm]
//! provider = "gemini"
//! model = "gemini-2.5-flash"
//! api_key_env = "API_KEY"
//! request_timeout_ms = 20000   # omit to wait on the transport
//!
//! [assistant]
//! fallback_message = "..."
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::{LlmClient, LlmProvider};
use crate::error::{LlmError, Result};
use crate::prompt;
use crate::types::ConversationMode;

/// Which hosted API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Gemini `generateContent`.
    #[default]
    Gemini,
    /// Any OpenAI-compatible chat-completions endpoint.
    #[serde(rename = "openai")]
    OpenAi,
    /// No provider; every call reports the service as unavailable.
    None,
}

/// Top-level assistant configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    /// Transport settings.
    #[serde(default)]
    pub llm: ProviderConfig,
    /// Framings and canned replies.
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Transport settings for the hosted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider kind.
    #[serde(default)]
    pub provider: ProviderKind,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Per-request timeout. `None` waits for the transport to give up.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    /// Extra attempts after a failed call.
    #[serde(default)]
    pub max_retries: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            request_timeout_ms: None,
            max_retries: 0,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ProviderConfig {
    /// The API key from config or environment, ignoring blank values.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Provider to use; a missing key downgrades to [`LlmProvider::None`].
    #[must_use]
    pub fn provider(&self) -> LlmProvider {
        let Some(api_key) = self.resolve_api_key() else {
            return LlmProvider::None;
        };
        match self.provider {
            ProviderKind::Gemini => LlmProvider::Gemini {
                base_url: self.base_url.clone(),
                api_key,
            },
            ProviderKind::OpenAi => LlmProvider::OpenAiCompatible {
                base_url: self.base_url.clone(),
                api_key,
            },
            ProviderKind::None => LlmProvider::None,
        }
    }
}

/// Framings and canned replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// System framing for code mode. `None` uses the built-in one.
    #[serde(default)]
    pub code_system_prompt: Option<String>,
    /// System framing for platform mode. `None` uses the built-in one.
    #[serde(default)]
    pub platform_system_prompt: Option<String>,
    /// Returned in platform mode when no credentials are configured.
    #[serde(default = "default_unavailable")]
    pub unavailable_message: String,
    /// Returned in code mode when no credentials are configured.
    #[serde(default = "default_code_unavailable")]
    pub code_unavailable_message: String,
    /// Appended when a call fails or times out.
    #[serde(default = "default_fallback")]
    pub fallback_message: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            code_system_prompt: None,
            platform_system_prompt: None,
            unavailable_message: default_unavailable(),
            code_unavailable_message: default_code_unavailable(),
            fallback_message: default_fallback(),
        }
    }
}

impl AssistantConfig {
    /// System framing for `mode`.
    #[must_use]
    pub fn system_prompt(&self, mode: ConversationMode) -> String {
        let configured = match mode {
            ConversationMode::Code => &self.code_system_prompt,
            ConversationMode::Platform => &self.platform_system_prompt,
        };
        configured
            .clone()
            .unwrap_or_else(|| prompt::default_system(mode))
    }

    /// Reply for `mode` when no credentials are configured.
    #[must_use]
    pub fn unavailable_message(&self, mode: ConversationMode) -> &str {
        match mode {
            ConversationMode::Code => &self.code_unavailable_message,
            ConversationMode::Platform => &self.unavailable_message,
        }
    }
}

impl LlmConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `LlmError::ConfigError` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| LlmError::ConfigError(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `LlmError::ConfigError` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LlmError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Build the client this configuration describes.
    #[must_use]
    pub fn client(&self) -> LlmClient {
        LlmClient::new(self.llm.provider(), &self.llm.model, self.llm.max_retries)
    }
}

fn default_base_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_model() -> String { "gemini-2.5-flash".to_string() }
fn default_api_key_env() -> String { "API_KEY".to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 1024 }
fn default_unavailable() -> String { prompt::UNAVAILABLE_MESSAGE.to_string() }
fn default_code_unavailable() -> String { prompt::CODE_UNAVAILABLE_MESSAGE.to_string() }
fn default_fallback() -> String { prompt::FALLBACK_MESSAGE.to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = LlmConfig::from_toml("").expect("empty is valid");
        assert_eq!(config.llm.provider, ProviderKind::Gemini);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.request_timeout_ms, None);
        assert_eq!(config.llm.max_retries, 0);
        assert_eq!(config.assistant.fallback_message, prompt::FALLBACK_MESSAGE);
    }

    #[test]
    fn missing_key_means_no_provider() {
        let config = LlmConfig::from_toml(
            r#"
            [llm]
            api_key_env = "LEARNZONE_TEST_KEY_THAT_IS_NEVER_SET"
            "#,
        )
        .expect("valid");
        assert!(matches!(config.llm.provider(), LlmProvider::None));
        assert!(!config.client().is_available());
    }

    #[test]
    fn explicit_key_selects_provider() {
        let config = LlmConfig::from_toml(
            r#"
            [llm]
            provider = "openai"
            base_url = "http://localhost:8080"
            api_key = "sk-test"
            request_timeout_ms = 15000
            "#,
        )
        .expect("valid");
        assert!(matches!(
            config.llm.provider(),
            LlmProvider::OpenAiCompatible { .. }
        ));
        assert_eq!(config.llm.request_timeout_ms, Some(15_000));
    }

    #[test]
    fn blank_key_is_treated_as_missing() {
        let config = LlmConfig::from_toml("[llm]\napi_key = \"  \"\napi_key_env = \"LEARNZONE_TEST_KEY_THAT_IS_NEVER_SET\"\n")
            .expect("valid");
        assert_eq!(config.llm.resolve_api_key(), None);
    }

    #[test]
    fn system_prompt_override() {
        let config = LlmConfig::from_toml("[assistant]\ncode_system_prompt = \"Be brief.\"\n")
            .expect("valid");
        assert_eq!(config.assistant.system_prompt(ConversationMode::Code), "Be brief.");
        assert_eq!(
            config.assistant.system_prompt(ConversationMode::Platform),
            prompt::default_system(ConversationMode::Platform)
        );
    }

    #[test]
    fn unknown_provider_is_config_error() {
        let err = LlmConfig::from_toml("[llm]\nprovider = \"carrier-pigeon\"\n")
            .expect_err("unknown provider");
        assert!(matches!(err, LlmError::ConfigError(_)));
    }
}
