//! LLM-backed analysis provider speaking the chat-completions protocol.

use async_trait::async_trait;
use driftscope_core::{AnalysisRequest, AnalysisResult, Config, ConfigError, ParseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::prompt::build_prompt;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("model returned no content")]
    EmptyResponse,
    #[error("failed to parse model output: {0}")]
    Parse(#[from] ParseError),
}

/// Produces a drift analysis for a `(source, translation)` pair.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyse(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ProviderError>;

    /// Model identifier recorded alongside each stored analysis.
    fn model_name(&self) -> &str;
}

/// Chat-completions client (OpenAI-compatible endpoints).
pub struct ChatProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

impl ChatProvider {
    /// Create a provider from validated configuration, targeting
    /// [`DEFAULT_API_BASE`].
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        config.require_provider()?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            api_key: config.api_key.clone(),
            model: config.model_name.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Point the client at another compatible endpoint, e.g.
    /// `http://localhost:11434/v1` (no trailing slash needed).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Send a single-message prompt and return the raw reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(url = %url, model = %self.model, "calling chat completions");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = resp.json().await?;
        reply.into_text()
    }
}

#[async_trait]
impl AnalysisProvider for ChatProvider {
    async fn analyse(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ProviderError> {
        let prompt = build_prompt(&request.source, &request.translation);
        let text = self.complete(&prompt).await?;
        let analysis = driftscope_core::parse_provider_text(&text).map_err(|e| {
            let raw: String = text.chars().take(200).collect();
            warn!(error = %e, raw = %raw, "model output is not a drift analysis");
            e
        })?;
        info!(
            source_language = %analysis.source_language,
            translation_language = %analysis.translation_language,
            items = analysis.drift_items.len(),
            "drift analysis received"
        );
        Ok(analysis)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
