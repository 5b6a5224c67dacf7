//! Hosted-model client: Gemini and OpenAI-compatible backends.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::types::{LlmRequest, LlmResponse};

/// Provider backend for inference.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    Gemini {
        /// API root, e.g. `https://generativelanguage.googleapis.com`.
        base_url: String,
        /// API key.
        api_key: String,
    },
    /// OpenAI-compatible chat-completions API.
    OpenAiCompatible {
        /// API root.
        base_url: String,
        /// Bearer token.
        api_key: String,
    },
    /// No credentials; every call reports the service as unavailable.
    None,
}

/// Routes requests to the configured backend.
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
    max_retries: u32,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let provider = match self.provider {
            LlmProvider::Gemini { .. } => "gemini",
            LlmProvider::OpenAiCompatible { .. } => "openai",
            LlmProvider::None => "none",
        };
        f.debug_struct("LlmClient")
            .field("provider", &provider)
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Create a new client.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>, max_retries: u32) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            max_retries,
        }
    }

    /// Create a client with no backend.
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), 0)
    }

    /// Check if the client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// Model name sent upstream.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a reply.
    ///
    /// # Errors
    /// `Unavailable` without a provider; `Timeout` if the final attempt
    /// timed out; otherwise `RetriesExhausted` once every attempt failed,
    /// or `ParseError` for an unusable body.
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No provider configured".into())),
            LlmProvider::Gemini { base_url, api_key } => {
                let url = format!(
                    "{}/v1beta/models/{}:generateContent",
                    base_url.trim_end_matches('/'),
                    self.model
                );
                let body = gemini_body(request);
                let (json, latency_ms) = self
                    .send_with_retries("gemini", request.timeout_ms, || {
                        self.http
                            .post(&url)
                            .header("x-goog-api-key", api_key.as_str())
                            .json(&body)
                    })
                    .await?;
                self.finish(parse_gemini(&json), latency_ms)
            }
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
                let body = openai_body(&self.model, request);
                let (json, latency_ms) = self
                    .send_with_retries("openai", request.timeout_ms, || {
                        self.http.post(&url).bearer_auth(api_key).json(&body)
                    })
                    .await?;
                self.finish(parse_openai(&json), latency_ms)
            }
        }
    }

    fn finish(&self, parsed: Result<(String, u32)>, latency_ms: u64) -> Result<LlmResponse> {
        let (text, tokens_generated) = parsed?;
        Ok(LlmResponse {
            text,
            tokens_generated,
            latency_ms,
            model: self.model.clone(),
        })
    }

    /// POST with retries; returns the JSON body and the latency of the
    /// successful attempt.
    async fn send_with_retries(
        &self,
        backend: &str,
        timeout_ms: Option<u64>,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<(Value, u64)> {
        let mut last_error = LlmError::RequestFailed("no attempt made".into());
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(backend, attempt = attempt + 1, of = self.max_retries + 1, "Retrying assistant call");
            }

            let mut req = build();
            if let Some(ms) = timeout_ms {
                req = req.timeout(Duration::from_millis(ms));
            }

            match send_once(req, timeout_ms).await {
                Ok(ok) => return Ok(ok),
                Err(LlmError::ParseError(e)) => return Err(LlmError::ParseError(e)),
                Err(e) => {
                    warn!(backend, error = %e, "Assistant request failed");
                    last_error = e;
                }
            }
        }

        Err(exhausted(self.max_retries + 1, last_error))
    }
}

async fn send_once(req: RequestBuilder, timeout_ms: Option<u64>) -> Result<(Value, u64)> {
    let start = Instant::now();
    let resp = req.send().await.map_err(|e| match (e.is_timeout(), timeout_ms) {
        (true, Some(ms)) => LlmError::Timeout(ms),
        _ => LlmError::from(e),
    })?;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await?;
        return Err(LlmError::RequestFailed(format!("HTTP {status}: {body}")));
    }
    let json: Value = resp.json().await?;
    Ok((json, latency_ms))
}

/// Error reported once every attempt failed. A timeout on the final
/// attempt is reported as such.
fn exhausted(attempts: u32, last_error: LlmError) -> LlmError {
    match last_error {
        LlmError::Timeout(ms) => LlmError::Timeout(ms),
        other => LlmError::RetriesExhausted {
            attempts,
            last_error: other.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Gemini `generateContent` body: system instruction, history, then prompt.
#[must_use]
pub fn gemini_body(request: &LlmRequest) -> Value {
    let mut contents: Vec<Value> = request
        .history
        .iter()
        .map(|turn| json!({ "role": turn.role.gemini_name(), "parts": [{ "text": turn.text }] }))
        .collect();
    contents.push(json!({ "role": "user", "parts": [{ "text": request.prompt }] }));

    json!({
        "systemInstruction": { "parts": [{ "text": request.system }] },
        "contents": contents,
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_tokens,
        }
    })
}

/// OpenAI chat-completions body.
#[must_use]
pub fn openai_body(model: &str, request: &LlmRequest) -> Value {
    let mut messages = vec![json!({ "role": "system", "content": request.system })];
    messages.extend(
        request
            .history
            .iter()
            .map(|turn| json!({ "role": turn.role.openai_name(), "content": turn.text })),
    );
    messages.push(json!({ "role": "user", "content": request.prompt }));

    json!({
        "model": model,
        "messages": messages,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    })
}

fn parse_gemini(json: &Value) -> Result<(String, u32)> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| LlmError::ParseError(format!("no candidate parts in response: {json}")))?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    let tokens = json["usageMetadata"]["candidatesTokenCount"]
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0);
    Ok((text, tokens))
}

fn parse_openai(json: &Value) -> Result<(String, u32)> {
    let text = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::ParseError(format!("no message content in response: {json}")))?
        .to_string();
    let tokens = json["usage"]["completion_tokens"]
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0);
    Ok((text, tokens))
}
