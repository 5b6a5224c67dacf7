//! Conversation and request types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which assistant a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    /// Programming tutor; keeps conversational history.
    Code,
    /// Platform guide; every question is answered on its own.
    Platform,
}

impl ConversationMode {
    /// Whether prior turns are forwarded to the model in this mode.
    #[must_use]
    pub fn carries_history(self) -> bool {
        matches!(self, Self::Code)
    }
}

impl fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => f.write_str("code"),
            Self::Platform => f.write_str("platform"),
        }
    }
}

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The student.
    User,
    /// The assistant (including fallback messages).
    Assistant,
}

/// One transcript entry. Append-only; never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Who wrote it.
    pub sender: Sender,
    /// Message text.
    pub text: String,
    /// Transcript it belongs to.
    pub mode: ConversationMode,
    /// When it was appended.
    pub sent_at: DateTime<Utc>,
}

impl ConversationMessage {
    /// A message stamped with the current time.
    #[must_use]
    pub fn new(sender: Sender, text: impl Into<String>, mode: ConversationMode) -> Self {
        Self {
            sender,
            text: text.into(),
            mode,
            sent_at: Utc::now(),
        }
    }
}

/// Role of a turn in the history forwarded upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// Student turn.
    User,
    /// Model turn.
    Model,
}

impl TurnRole {
    /// Role name in OpenAI-style chat payloads.
    #[must_use]
    pub fn openai_name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "assistant",
        }
    }

    /// Role name in Gemini payloads.
    #[must_use]
    pub fn gemini_name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One role-tagged turn of conversational history, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    /// Who said it.
    pub role: TurnRole,
    /// What was said.
    pub text: String,
}

impl From<&ConversationMessage> for HistoryTurn {
    fn from(msg: &ConversationMessage) -> Self {
        Self {
            role: match msg.sender {
                Sender::User => TurnRole::User,
                Sender::Assistant => TurnRole::Model,
            },
            text: msg.text.clone(),
        }
    }
}

/// A request to the hosted model.
#[derive(Debug, Clone, Serialize)]
pub struct LlmRequest {
    /// System framing.
    pub system: String,
    /// Prior turns, oldest first. Empty for stateless queries.
    pub history: Vec<HistoryTurn>,
    /// The new user prompt.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Per-attempt timeout in milliseconds; `None` waits on the transport.
    pub timeout_ms: Option<u64>,
}

impl LlmRequest {
    /// A request with default sampling settings and no history.
    #[must_use]
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            history: Vec::new(),
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout_ms: None,
        }
    }

    /// Attach conversational history.
    #[must_use]
    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A response from the hosted model.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmResponse {
    /// The generated text.
    pub text: String,
    /// How many tokens were generated, if reported.
    pub tokens_generated: u32,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model was used.
    pub model: String,
}
