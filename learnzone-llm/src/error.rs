//! Hosted-model error types.

use thiserror::Error;

/// Errors that can occur while calling the hosted model.
///
/// None of these reach the student: [`crate::AssistantSession`] turns every
/// one of them into the configured fallback message.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("Assistant request failed: {0}")]
    RequestFailed(String),

    /// The response body was not the expected JSON shape.
    #[error("Failed to parse assistant response: {0}")]
    ParseError(String),

    /// The final attempt exceeded the per-attempt timeout (ms).
    #[error("Assistant request timed out after {0}ms")]
    Timeout(u64),

    /// Provider is unreachable or not configured.
    #[error("Assistant provider unavailable: {0}")]
    Unavailable(String),

    /// All retry attempts exhausted.
    #[error("All assistant retry attempts exhausted after {attempts} tries: {last_error}")]
    RetriesExhausted {
        /// Attempts made, including the first.
        attempts: u32,
        /// Error from the final attempt.
        last_error: String,
    },

    /// Configuration error.
    #[error("Assistant configuration error: {0}")]
    ConfigError(String),
}

/// Transport errors. Timeouts are mapped by the caller, which knows the
/// configured limit.
impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::ParseError(err.to_string())
        } else if err.is_connect() {
            LlmError::Unavailable(err.to_string())
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LlmError>;
