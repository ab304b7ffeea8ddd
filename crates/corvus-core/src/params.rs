//! Validated model generation parameters.

use serde::{Deserialize, Serialize};

/// Which LLM provider a set of parameters targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Anthropic (Claude models).
    Anthropic,
    /// `OpenAI` (GPT models).
    OpenAi,
}

impl ProviderKind {
    /// Get the provider name as a string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }

    /// Inclusive upper bound on `max_tokens` for this provider.
    #[must_use]
    pub fn max_tokens_ceiling(self) -> u32 {
        match self {
            Self::Anthropic => 8_192,
            Self::OpenAi => 16_384,
        }
    }

    /// Inclusive upper bound on `temperature` for this provider.
    #[must_use]
    pub fn temperature_ceiling(self) -> f32 {
        match self {
            Self::Anthropic => 1.0,
            Self::OpenAi => 2.0,
        }
    }
}

/// Generation parameters for one provider, validated at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// The provider these parameters target.
    pub provider: ProviderKind,
    /// Model identifier, e.g. `claude-3-5-sonnet-latest`.
    pub model: String,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling parameter.
    pub top_p: f32,
}

impl ModelParams {
    /// Construct validated parameters, applying the provider's ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamsError`] when `max_tokens` is zero or above the
    /// provider ceiling, `temperature` is outside the provider range, or
    /// `top_p` is outside `[0.0, 1.0]`.
    pub fn new(
        provider: ProviderKind,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
        top_p: f32,
    ) -> Result<Self, ParamsError> {
        let ceiling = provider.max_tokens_ceiling();
        if max_tokens == 0 || max_tokens > ceiling {
            return Err(ParamsError::MaxTokensOutOfRange {
                value: max_tokens,
                ceiling,
            });
        }

        let temp_ceiling = provider.temperature_ceiling();
        if !(0.0..=temp_ceiling).contains(&temperature) {
            return Err(ParamsError::TemperatureOutOfRange {
                value: temperature,
                ceiling: temp_ceiling,
            });
        }

        if !(0.0..=1.0).contains(&top_p) {
            return Err(ParamsError::TopPOutOfRange(top_p));
        }

        Ok(Self {
            provider,
            model: model.into(),
            max_tokens,
            temperature,
            top_p,
        })
    }
}

/// Validation errors for model parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// `max_tokens` is zero or above the provider ceiling.
    #[error("max_tokens must be between 1 and {ceiling}, got {value}")]
    MaxTokensOutOfRange {
        /// The rejected value.
        value: u32,
        /// Inclusive upper bound.
        ceiling: u32,
    },

    /// `temperature` is outside the provider range.
    #[error("temperature must be between 0.0 and {ceiling}, got {value}")]
    TemperatureOutOfRange {
        /// The rejected value.
        value: f32,
        /// Inclusive upper bound.
        ceiling: f32,
    },

    /// `top_p` is outside `[0.0, 1.0]`.
    #[error("top_p must be between 0.0 and 1.0, got {0}")]
    TopPOutOfRange(f32),
}
