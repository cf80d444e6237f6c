/// LLM Client — the Generation Port and its single backend.
///
/// ARCHITECTURAL RULE: stages never talk to a provider directly. Every call goes
/// through `GenerationPort::generate`, so the orchestrator can be driven by a
/// scripted port in tests and a new backend can be routed in without touching
/// call sites.
///
/// Backend: Anthropic Messages API, model hardcoded below.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub mod prompts;

use prompts::JSON_ONLY_SYSTEM;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Environment variable holding the backend credential. Read on first call.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// The model used for every stage.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;

/// The kind of work a prompt belongs to. Carried for routing; the current
/// backend treats all tasks the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Research,
    Copy,
    Qa,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Research => "research",
            TaskKind::Copy => "copy",
            TaskKind::Qa => "qa",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Generation backend is not configured: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Configuration failures will not fix themselves between attempts.
    pub fn is_transient(&self) -> bool {
        !matches!(self, LlmError::Configuration(_))
    }
}

/// Produce text from a prompt for a named task.
///
/// Held by the orchestrator as `Arc<dyn GenerationPort>`.
#[async_trait]
pub trait GenerationPort: Send + Sync {
    async fn generate(&self, task: TaskKind, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Connection handle created on first use.
struct Backend {
    client: Client,
    api_key: String,
}

/// The generation backend used by all three stages.
///
/// Construction is free: the HTTP client and credential are set up once, on the
/// first `generate` call, behind a `OnceCell`. Concurrent first calls wait on the
/// same initialisation; after that calls run in parallel without locking.
pub struct LlmClient {
    credential_var: String,
    timeout: Duration,
    backend: OnceCell<Backend>,
}

impl LlmClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            credential_var: API_KEY_VAR.to_string(),
            timeout,
            backend: OnceCell::new(),
        }
    }

    #[cfg(test)]
    fn with_credential_var(credential_var: &str, timeout: Duration) -> Self {
        Self {
            credential_var: credential_var.to_string(),
            timeout,
            backend: OnceCell::new(),
        }
    }

    /// Returns the backend, initialising it on first call.
    /// A missing credential leaves the cell empty so a later call can retry setup.
    async fn backend(&self) -> Result<&Backend, LlmError> {
        self.backend
            .get_or_try_init(|| async {
                let api_key = std::env::var(&self.credential_var)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| {
                        LlmError::Configuration(format!(
                            "environment variable '{}' is not set",
                            self.credential_var
                        ))
                    })?;

                let client = Client::builder().timeout(self.timeout).build()?;
                info!("LLM backend initialized (model: {MODEL})");

                Ok(Backend { client, api_key })
            })
            .await
    }

    /// Makes a single call to the Messages API. No retries at this layer.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let backend = self.backend().await?;

        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = backend
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &backend.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl GenerationPort for LlmClient {
    async fn generate(&self, task: TaskKind, prompt: &str) -> Result<String, LlmError> {
        debug!(task = %task, prompt_chars = prompt.len(), "Dispatching generation call");

        let response = self.call(prompt, JSON_ONLY_SYSTEM).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;

        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        Ok(text.to_string())
    }
}
