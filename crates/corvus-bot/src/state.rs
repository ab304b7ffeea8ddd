//! Application state.
//!
//! Constructed once in `main` and passed by handle to every component that
//! needs it; nothing here is a lazy global.

use std::sync::Arc;

use sqlx::SqlitePool;

use corvus_store::{AccessStore, UsageStore};

use crate::config::Config;
use crate::conversation::Conversations;
use crate::llm::{AnthropicClient, OpenAiClient};

/// Shared state for all handlers and the scheduler.
#[derive(Clone)]
pub struct AppState {
    /// Process configuration.
    pub config: Arc<Config>,

    /// Access grant store.
    pub access: AccessStore,

    /// Quota and usage counter store.
    pub usage: UsageStore,

    /// Anthropic provider client.
    pub anthropic: Arc<AnthropicClient>,

    /// OpenAI provider client.
    pub openai: Arc<OpenAiClient>,

    /// Live per-thread conversation state.
    pub conversations: Conversations,
}

impl AppState {
    /// Build the application state from an open pool and loaded config.
    #[must_use]
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let anthropic = Arc::new(AnthropicClient::new(config.anthropic.api_key.clone()));
        let openai = Arc::new(OpenAiClient::new(config.openai.api_key.clone()));
        let access = AccessStore::new(pool.clone(), config.timezone);
        let usage = UsageStore::new(pool, config.timezone);

        Self {
            config: Arc::new(config),
            access,
            usage,
            anthropic,
            openai,
            conversations: Conversations::new(),
        }
    }
}
