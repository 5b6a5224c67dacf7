//! Assistant session: per-mode transcripts and the single in-flight call.
//!
//! Each [`AssistantSession`] keeps one append-only transcript, tagged by
//! [`ConversationMode`]. A send appends the student's message, calls the
//! backend and appends exactly one assistant message: the reply, or the
//! fallback text if the call failed, timed out or was abandoned. Failures
//! never reach the caller.
//!
//! Only one call may be outstanding. A send while another is pending
//! returns [`SendOutcome::Busy`] and leaves the transcript untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::assistant::AssistantBackend;
use crate::config::LlmConfig;
use crate::types::{ConversationMessage, ConversationMode, HistoryTurn, Sender};

/// What a [`AssistantSession::send`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// Another call is pending; nothing changed.
    Busy,
    /// The backend's reply was appended.
    Replied,
    /// The call failed or timed out; the fallback text was appended.
    FellBack,
}

/// One student's assistant panel.
pub struct AssistantSession<B> {
    backend: B,
    messages: Mutex<Vec<ConversationMessage>>,
    in_flight: AtomicBool,
    timeout: Option<Duration>,
    fallback_message: String,
}

impl<B> std::fmt::Debug for AssistantSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantSession")
            .field("messages", &self.messages.lock().len())
            .field("pending", &self.in_flight.load(Ordering::Acquire))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<B: AssistantBackend> AssistantSession<B> {
    /// A session with no timeout.
    #[must_use]
    pub fn new(backend: B, fallback_message: impl Into<String>) -> Self {
        Self {
            backend,
            messages: Mutex::new(Vec::new()),
            in_flight: AtomicBool::new(false),
            timeout: None,
            fallback_message: fallback_message.into(),
        }
    }

    /// A session using the configured fallback text and timeout.
    #[must_use]
    pub fn from_config(backend: B, config: &LlmConfig) -> Self {
        Self::new(backend, config.assistant.fallback_message.clone())
            .with_timeout(config.llm.request_timeout_ms.map(Duration::from_millis))
    }

    /// Bound how long a send waits for the backend. `None` waits
    /// indefinitely.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a message in `mode`.
    ///
    /// Dropping the returned future while the call is pending abandons the
    /// call; the fallback text is appended in its place.
    pub async fn send(&self, text: &str, mode: ConversationMode) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(%mode, "Assistant busy; send rejected");
            return SendOutcome::Busy;
        }
        let mut pending = PendingReply {
            session: self,
            mode,
            resolved: false,
        };

        let history = {
            let mut messages = self.messages.lock();
            let history = if mode.carries_history() {
                history_of(&messages, mode)
            } else {
                Vec::new()
            };
            messages.push(ConversationMessage::new(Sender::User, text, mode));
            history
        };

        let call = async {
            match mode {
                ConversationMode::Code => self.backend.code_help(text, &history).await,
                ConversationMode::Platform => self.backend.platform_help(text).await,
            }
        };
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(%mode, timeout = ?limit, "Assistant call timed out");
                    return pending.resolve(None);
                }
            },
            None => call.await,
        };

        match result {
            Ok(reply) => pending.resolve(Some(reply)),
            Err(e) => {
                warn!(%mode, error = %e, "Assistant call failed");
                pending.resolve(None)
            }
        }
    }

    /// Messages of one mode, oldest first.
    #[must_use]
    pub fn transcript(&self, mode: ConversationMode) -> Vec<ConversationMessage> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.mode == mode)
            .cloned()
            .collect()
    }

    /// History the next send in `mode` would forward.
    #[must_use]
    pub fn history_for(&self, mode: ConversationMode) -> Vec<HistoryTurn> {
        if mode.carries_history() {
            history_of(&self.messages.lock(), mode)
        } else {
            Vec::new()
        }
    }

    /// Whether a call is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Total messages across both modes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Whether nothing has been sent yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn history_of(messages: &[ConversationMessage], mode: ConversationMode) -> Vec<HistoryTurn> {
    messages
        .iter()
        .filter(|m| m.mode == mode)
        .map(HistoryTurn::from)
        .collect()
}

/// Holds the in-flight flag for one send and appends exactly one reply.
struct PendingReply<'a, B> {
    session: &'a AssistantSession<B>,
    mode: ConversationMode,
    resolved: bool,
}

impl<B> PendingReply<'_, B> {
    fn resolve(&mut self, reply: Option<String>) -> SendOutcome {
        let (text, outcome) = match reply {
            Some(text) => (text, SendOutcome::Replied),
            None => (self.session.fallback_message.clone(), SendOutcome::FellBack),
        };
        self.session
            .messages
            .lock()
            .push(ConversationMessage::new(Sender::Assistant, text, self.mode));
        self.resolved = true;
        outcome
    }
}

impl<B> Drop for PendingReply<'_, B> {
    fn drop(&mut self) {
        if !self.resolved {
            debug!(mode = %self.mode, "Assistant call abandoned");
            self.resolve(None);
        }
        self.session.in_flight.store(false, Ordering::Release);
    }
}
