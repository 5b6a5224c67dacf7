//! Assistant Flow Tests: session + backend wired through the public API.
//!
//! No network: the hosted assistant runs without credentials, and the
//! failure paths use a local backend.

use std::time::Duration;

use async_trait::async_trait;
use learnzone_llm::error::{LlmError, Result};
use learnzone_llm::prompt;
use learnzone_llm::{
    AssistantBackend, AssistantSession, ConversationMode, HistoryTurn, HostedAssistant, LlmClient,
    LlmConfig, SendOutcome, Sender,
};

struct Unreachable;

#[async_trait]
impl AssistantBackend for Unreachable {
    async fn code_help(&self, _prompt: &str, _history: &[HistoryTurn]) -> Result<String> {
        Err(LlmError::Unavailable("connection refused".into()))
    }

    async fn platform_help(&self, _prompt: &str) -> Result<String> {
        Err(LlmError::RetriesExhausted {
            attempts: 1,
            last_error: "HTTP 429".into(),
        })
    }
}

struct Stalled;

#[async_trait]
impl AssistantBackend for Stalled {
    async fn code_help(&self, _prompt: &str, _history: &[HistoryTurn]) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Ok("too late".into())
    }

    async fn platform_help(&self, _prompt: &str) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Ok("too late".into())
    }
}

#[tokio::test]
async fn hosted_assistant_without_key_replies_unavailable() {
    let config = LlmConfig::default();
    let session = AssistantSession::from_config(
        HostedAssistant::with_client(LlmClient::none(), &config),
        &config,
    );

    assert_eq!(
        session.send("ما هي المتغيرات؟", ConversationMode::Code).await,
        SendOutcome::Replied
    );
    let code = session.transcript(ConversationMode::Code);
    assert_eq!(code.len(), 2);
    assert_eq!(code[1].sender, Sender::Assistant);
    assert_eq!(code[1].text, prompt::CODE_UNAVAILABLE_MESSAGE);

    assert_eq!(
        session.send("كيف أجمع النقاط؟", ConversationMode::Platform).await,
        SendOutcome::Replied
    );
    let platform = session.transcript(ConversationMode::Platform);
    assert_eq!(platform[1].text, prompt::UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn both_modes_recover_from_errors() {
    let config = LlmConfig::default();
    let session = AssistantSession::from_config(Unreachable, &config);

    assert_eq!(session.send("a", ConversationMode::Code).await, SendOutcome::FellBack);
    assert_eq!(session.send("b", ConversationMode::Platform).await, SendOutcome::FellBack);

    for mode in [ConversationMode::Code, ConversationMode::Platform] {
        let transcript = session.transcript(mode);
        assert_eq!(transcript.len(), 2, "{mode}");
        assert_eq!(transcript[1].text, prompt::FALLBACK_MESSAGE);
        assert!(transcript.iter().all(|m| m.mode == mode));
    }
    assert_eq!(session.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn configured_timeout_converts_stall_into_fallback() {
    let config = LlmConfig::from_toml(
        r#"
        [llm]
        request_timeout_ms = 20000

        [assistant]
        fallback_message = "try again later"
        "#,
    )
    .expect("valid config");
    let session = AssistantSession::from_config(Stalled, &config);

    assert_eq!(session.send("hello", ConversationMode::Platform).await, SendOutcome::FellBack);
    let platform = session.transcript(ConversationMode::Platform);
    assert_eq!(platform[1].text, "try again later");
    assert!(!session.is_pending());
}

#[tokio::test]
async fn transcripts_keep_send_order() {
    let config = LlmConfig::default();
    let session = AssistantSession::from_config(
        HostedAssistant::with_client(LlmClient::none(), &config),
        &config,
    );
    for text in ["one", "two", "three"] {
        session.send(text, ConversationMode::Code).await;
    }
    let user_texts: Vec<String> = session
        .transcript(ConversationMode::Code)
        .into_iter()
        .filter(|m| m.sender == Sender::User)
        .map(|m| m.text)
        .collect();
    assert_eq!(user_texts, ["one", "two", "three"]);
    assert_eq!(session.history_for(ConversationMode::Code).len(), 6);
}
