//! LLM provider clients.
//!
//! Two independent providers are supported; both reduce to
//! `generate(system prompt, history, params) → text or typed failure`.
//! Failures never cross the module boundary raw: [`generate`] logs the
//! underlying error and returns a uniform [`ResponseResult`].

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

use corvus_core::{
    ChatHistory, ModelParams, ProviderKind, ResponseResult, WireMessage, ROLE_ASSISTANT,
    ROLE_DEVELOPER,
};

use crate::state::AppState;

/// Errors from a provider call.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Connection, timeout, or other transport failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        message: String,
    },

    /// The provider answered successfully but with no text content.
    #[error("completion contained no text")]
    EmptyCompletion,
}

/// Generate a completion from the provider the parameters target.
///
/// Each provider gets the conversation rendered its own way: Anthropic
/// takes the system prompt as a dedicated field and the history with a
/// trailing empty assistant turn; OpenAI takes a leading `developer`
/// message carrying the system prompt.
///
/// Any provider failure is logged here with the underlying message and
/// surfaced as an `Error` result; usage must not be accounted for such
/// results.
pub async fn generate(
    state: &AppState,
    system_prompt: &str,
    history: &ChatHistory,
    params: &ModelParams,
) -> ResponseResult {
    let bot_name = &state.config.bot_name;

    let outcome = match params.provider {
        ProviderKind::Anthropic => {
            let mut messages = history.render(bot_name);
            messages.push(WireMessage {
                role: ROLE_ASSISTANT.to_string(),
                content: String::new(),
            });
            state.anthropic.generate(system_prompt, &messages, params).await
        }
        ProviderKind::OpenAi => {
            let mut messages = vec![WireMessage {
                role: ROLE_DEVELOPER.to_string(),
                content: system_prompt.to_string(),
            }];
            messages.extend(history.render(bot_name));
            state.openai.generate(&messages, params).await
        }
    };

    match outcome {
        Ok(text) => ResponseResult::success(text),
        Err(err) => {
            tracing::error!(
                provider = params.provider.as_str(),
                model = %params.model,
                error = %err,
                "failed to generate completion"
            );
            ResponseResult::error()
        }
    }
}
