//! Environment configuration.
//!
//! Every required setting is fatal when missing or malformed; nothing is
//! silently defaulted. The one optional knob (`ADVANCED_OVERRIDES_BLOCK`)
//! has a documented default.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;

use corvus_core::{ModelParams, ParamsError, ProviderKind};

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A setting is present but cannot be parsed.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// The setting name.
        name: &'static str,
        /// Why parsing failed.
        reason: String,
    },

    /// The system prompt document could not be read.
    #[error("failed to read system prompt {path}: {source}")]
    PromptFile {
        /// The configured path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Model parameters failed provider-range validation.
    #[error("invalid model parameters: {0}")]
    Params(#[from] ParamsError),
}

/// Per-provider configuration: credentials plus validated defaults.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API key for the provider.
    pub api_key: String,

    /// Default generation parameters.
    pub params: ModelParams,
}

/// Process configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Timezone for daily boundaries (quota days, midnight reset).
    pub timezone: Tz,

    /// Static admin allow-list (not DB-backed).
    pub admin_user_ids: Vec<i64>,

    /// Static allow-list of authorized server IDs.
    pub authorized_server_ids: Vec<i64>,

    /// The bot's display name; messages authored under this name render as
    /// `assistant` turns.
    pub bot_name: String,

    /// Maximum characters per outbound message chunk.
    pub max_chars_per_message: usize,

    /// Maximum thread length before the conversation is closed.
    pub chat_context_window: u32,

    /// Tie-break for users holding both `advanced` and `blocked`: when
    /// true, `advanced` exempts the user from the block. Default false.
    pub advanced_overrides_block: bool,

    /// System prompt for the chat feature, loaded from a document.
    pub chat_system_prompt: String,

    /// Anthropic-style provider settings.
    pub anthropic: ProviderConfig,

    /// OpenAI-style provider settings.
    pub openai: ProviderConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for any missing or malformed setting.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_path = PathBuf::from(required("DATABASE_PATH")?);
        let timezone = parse_value("TIMEZONE", &required("TIMEZONE")?)?;
        let admin_user_ids = parse_id_list("ADMIN_USER_IDS", &required("ADMIN_USER_IDS")?)?;
        let authorized_server_ids =
            parse_id_list("AUTHORIZED_SERVER_IDS", &required("AUTHORIZED_SERVER_IDS")?)?;
        let bot_name = required("BOT_NAME")?;
        let max_chars_per_message: usize =
            parse_value("MAX_CHARS_PER_MESSAGE", &required("MAX_CHARS_PER_MESSAGE")?)?;
        if max_chars_per_message == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_CHARS_PER_MESSAGE",
                reason: "must be at least 1".to_string(),
            });
        }
        let chat_context_window =
            parse_value("CHAT_CONTEXT_WINDOW", &required("CHAT_CONTEXT_WINDOW")?)?;

        let advanced_overrides_block = match std::env::var("ADVANCED_OVERRIDES_BLOCK") {
            Ok(value) => parse_value("ADVANCED_OVERRIDES_BLOCK", &value)?,
            Err(_) => false,
        };

        let prompt_path = required("CHAT_SYSTEM_PROMPT_PATH")?;
        let chat_system_prompt =
            std::fs::read_to_string(&prompt_path).map_err(|source| ConfigError::PromptFile {
                path: prompt_path,
                source,
            })?;

        let anthropic = ProviderConfig {
            api_key: required("ANTHROPIC_API_KEY")?,
            params: ModelParams::new(
                ProviderKind::Anthropic,
                required("ANTHROPIC_MODEL")?,
                parse_value("ANTHROPIC_MAX_TOKENS", &required("ANTHROPIC_MAX_TOKENS")?)?,
                parse_value("ANTHROPIC_TEMPERATURE", &required("ANTHROPIC_TEMPERATURE")?)?,
                parse_value("ANTHROPIC_TOP_P", &required("ANTHROPIC_TOP_P")?)?,
            )?,
        };

        let openai = ProviderConfig {
            api_key: required("OPENAI_API_KEY")?,
            params: ModelParams::new(
                ProviderKind::OpenAi,
                required("OPENAI_MODEL")?,
                parse_value("OPENAI_MAX_TOKENS", &required("OPENAI_MAX_TOKENS")?)?,
                parse_value("OPENAI_TEMPERATURE", &required("OPENAI_TEMPERATURE")?)?,
                parse_value("OPENAI_TOP_P", &required("OPENAI_TOP_P")?)?,
            )?,
        };

        Ok(Self {
            database_path,
            timezone,
            admin_user_ids,
            authorized_server_ids,
            bot_name,
            max_chars_per_message,
            chat_context_window,
            advanced_overrides_block,
            chat_system_prompt,
            anthropic,
            openai,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_value<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_id_list(name: &'static str, value: &str) -> Result<Vec<i64>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| ConfigError::Invalid {
                name,
                reason: format!("{s:?} is not an integer id"),
            })
        })
        .collect()
}
