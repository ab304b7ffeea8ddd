//! Anthropic Messages API client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use corvus_core::{ModelParams, WireMessage};

use super::CompletionError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
///
/// No retries and no extra timeout: a failure or hang affects only the one
/// event awaiting this call.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
    api_key: String,
    base_url: String,
}

// ── Wire types (only what the generation path needs) ─────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [WireMessage],
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    /// Create a client against the production endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (used by tests).
    #[must_use]
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Request a completion for the rendered conversation.
    ///
    /// # Errors
    ///
    /// Returns a [`CompletionError`] on transport failure, a non-success
    /// status, or a response with no text block.
    pub async fn generate(
        &self,
        system_prompt: &str,
        messages: &[WireMessage],
        params: &ModelParams,
    ) -> Result<String, CompletionError> {
        let body = MessagesRequest {
            model: &params.model,
            max_tokens: params.max_tokens,
            system: system_prompt,
            messages,
            temperature: params.temperature,
            top_p: params.top_p,
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .find_map(|block| block.text)
            .ok_or(CompletionError::EmptyCompletion)
    }
}
