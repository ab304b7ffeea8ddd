//! OpenAI chat completions client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use corvus_core::{ModelParams, WireMessage};

use super::CompletionError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
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
    /// The system prompt travels as the leading `developer` message inside
    /// `messages`; the caller builds that.
    ///
    /// # Errors
    ///
    /// Returns a [`CompletionError`] on transport failure, a non-success
    /// status, or a response with no content.
    pub async fn generate(
        &self,
        messages: &[WireMessage],
        params: &ModelParams,
    ) -> Result<String, CompletionError> {
        let body = ChatCompletionRequest {
            model: &params.model,
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvus_core::ProviderKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params() -> ModelParams {
        ModelParams::new(ProviderKind::OpenAi, "gpt-4o", 1024, 1.0, 0.9).unwrap()
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "certainly"}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url("test-key", server.uri());
        let messages = [WireMessage {
            role: "user".into(),
            content: "hello".into(),
        }];
        let text = client.generate(&messages, &params()).await.unwrap();
        assert_eq!(text, "certainly");
    }

    #[tokio::test]
    async fn bad_request_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad model"))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url("test-key", server.uri());
        let err = client.generate(&[], &params()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Api { status: 400, .. }));
    }
}
