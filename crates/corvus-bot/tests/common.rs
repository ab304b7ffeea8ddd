//! Common test utilities for corvus-bot integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use corvus_bot::config::{Config, ProviderConfig};
use corvus_bot::gateway::{
    CommandContext, Gateway, GatewayError, HistoryMessage, MessageEvent, Notice, ThreadInfo,
};
use corvus_bot::llm::{AnthropicClient, OpenAiClient};
use corvus_bot::AppState;
use corvus_core::{ModelParams, ProviderKind};

/// The bot's own platform user id in tests.
pub const BOT_USER_ID: i64 = 42;
/// A user on the admin allow-list.
pub const ADMIN_ID: i64 = 1;
/// The one authorized server.
pub const SERVER_ID: i64 = 100;
/// A plain user with no privileges.
pub const USER_ID: i64 = 777;

/// Test harness: a fresh database-backed state per test.
pub struct TestHarness {
    /// Fully wired application state.
    pub state: AppState,
    /// Temporary directory holding the database (kept alive for the test).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Harness with default configuration and no reachable providers.
    pub async fn new() -> Self {
        Self::build(|_| {}).await
    }

    /// Harness with the configuration adjusted before state construction.
    pub async fn build(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let db_path = temp_dir.path().join("corvus.sqlite");

        let mut config = test_config(&db_path);
        adjust(&mut config);

        let pool = corvus_store::connect(&db_path)
            .await
            .expect("failed to open store");
        let state = AppState::new(pool, config);
        state
            .access
            .create_table()
            .await
            .expect("failed to create access table");
        state
            .usage
            .create_tables()
            .await
            .expect("failed to create usage tables");

        Self {
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Point the Anthropic client at a mock server.
    pub fn route_anthropic(&mut self, base_url: &str) {
        self.state.anthropic = Arc::new(AnthropicClient::with_base_url("test-key", base_url));
    }

    /// Point the OpenAI client at a mock server.
    pub fn route_openai(&mut self, base_url: &str) {
        self.state.openai = Arc::new(OpenAiClient::with_base_url("test-key", base_url));
    }
}

/// A configuration with every field filled for tests.
pub fn test_config(db_path: &Path) -> Config {
    Config {
        database_path: db_path.to_path_buf(),
        timezone: chrono_tz::UTC,
        admin_user_ids: vec![ADMIN_ID],
        authorized_server_ids: vec![SERVER_ID],
        bot_name: "corvus".to_string(),
        max_chars_per_message: 2000,
        chat_context_window: 50,
        advanced_overrides_block: false,
        chat_system_prompt: "You are a helpful assistant.".to_string(),
        anthropic: ProviderConfig {
            api_key: "test-key".to_string(),
            params: ModelParams::new(
                ProviderKind::Anthropic,
                "claude-3-5-sonnet-latest",
                1024,
                0.7,
                0.9,
            )
            .expect("valid anthropic params"),
        },
        openai: ProviderConfig {
            api_key: "test-key".to_string(),
            params: ModelParams::new(ProviderKind::OpenAi, "gpt-4o", 1024, 0.7, 0.9)
                .expect("valid openai params"),
        },
    }
}

/// Command context for the given user on the authorized server.
pub fn ctx(user_id: i64) -> CommandContext {
    CommandContext {
        user_id,
        guild_id: SERVER_ID,
    }
}

/// A live thread owned by the bot.
pub fn bot_thread(id: i64, message_count: u32) -> ThreadInfo {
    ThreadInfo {
        id,
        name: "chat".to_string(),
        owner_id: BOT_USER_ID,
        archived: false,
        locked: false,
        message_count,
    }
}

/// A message event in the given thread.
pub fn message(author_id: i64, thread: ThreadInfo) -> MessageEvent {
    MessageEvent {
        author_id,
        guild_id: SERVER_ID,
        content: "hello".to_string(),
        thread,
    }
}

/// First thread id handed out by [`MockGateway::create_thread`].
pub const FIRST_CREATED_THREAD_ID: i64 = 5000;

/// In-memory gateway that records everything the handlers do.
#[derive(Default)]
pub struct MockGateway {
    /// Canned thread history, newest first.
    pub history: Vec<HistoryMessage>,
    /// Plain messages sent, as `(channel_id, text)`.
    pub sent: Mutex<Vec<(i64, String)>>,
    /// Notices sent, as `(channel_id, notice)`.
    pub notices: Mutex<Vec<(i64, Notice)>>,
    /// Threads locked.
    pub locked: Mutex<Vec<i64>>,
    /// Threads created, as `(channel_id, name)`.
    pub created: Mutex<Vec<(i64, String)>>,
}

impl MockGateway {
    /// Gateway with a canned newest-first history.
    pub fn with_history(history: Vec<HistoryMessage>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    /// Texts of all plain messages sent so far.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// All notices sent so far.
    pub fn sent_notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|(_, notice)| notice.clone())
            .collect()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn bot_user_id(&self) -> i64 {
        BOT_USER_ID
    }

    async fn create_thread(&self, channel_id: i64, name: &str) -> Result<ThreadInfo, GatewayError> {
        let mut created = self.created.lock().unwrap();
        let id = FIRST_CREATED_THREAD_ID + created.len() as i64;
        created.push((channel_id, name.to_string()));
        Ok(ThreadInfo {
            id,
            name: name.to_string(),
            owner_id: BOT_USER_ID,
            archived: false,
            locked: false,
            message_count: 1,
        })
    }

    async fn send_message(&self, channel_id: i64, text: &str) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel_id, text.to_string()));
        Ok(())
    }

    async fn send_notice(&self, channel_id: i64, notice: Notice) -> Result<(), GatewayError> {
        self.notices.lock().unwrap().push((channel_id, notice));
        Ok(())
    }

    async fn thread_history(
        &self,
        _thread_id: i64,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>, GatewayError> {
        Ok(self
            .history
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn lock_thread(&self, thread_id: i64) -> Result<(), GatewayError> {
        self.locked.lock().unwrap().push(thread_id);
        Ok(())
    }
}

/// One history line.
pub fn history_message(author_name: &str, content: &str) -> HistoryMessage {
    HistoryMessage {
        author_name: author_name.to_string(),
        content: content.to_string(),
    }
}
