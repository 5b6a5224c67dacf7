//! # learnzone-llm: Assistant Layer for LearnZone
//!
//! Two chat assistants sit beside the learning zone:
//!   - **Code**: a programming tutor that remembers the conversation
//!   - **Platform**: a guide to courses, plans and points, stateless per question
//!
//! Both are answered by a hosted model (Gemini by default, or any
//! OpenAI-compatible endpoint). This crate provides:
//!   - [`LlmClient`]: the HTTP client with retries and optional timeouts
//!   - [`AssistantBackend`]: the seam the session talks to, with
//!     [`HostedAssistant`] as the production implementation
//!   - [`AssistantSession`]: per-mode transcripts, one call in flight,
//!     failures turned into a fixed fallback message
//!
//! # Degradation
//!
//! ```text
//! no credentials        → "service unavailable" reply (not an error)
//! HTTP / parse failure  → fallback message appended
//! timeout (if set)      → fallback message appended
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assistant;
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod session;
pub mod types;

pub use assistant::{AssistantBackend, HostedAssistant};
pub use client::{LlmClient, LlmProvider};
pub use config::LlmConfig;
pub use error::LlmError;
pub use session::{AssistantSession, SendOutcome};
pub use types::{ConversationMessage, ConversationMode, HistoryTurn, LlmRequest, LlmResponse, Sender};
