//! The messaging-platform seam.
//!
//! The platform client (connection, event dispatch, command registration,
//! UI widgets) is an external collaborator. Handlers in this crate consume
//! inbound event values and talk back through the [`Gateway`] trait, so
//! tests drive them with an in-memory fake.

use async_trait::async_trait;

/// A thread as reported by the platform alongside an event.
#[derive(Debug, Clone)]
pub struct ThreadInfo {
    /// Platform thread identifier.
    pub id: i64,
    /// Thread title.
    pub name: String,
    /// User that created the thread.
    pub owner_id: i64,
    /// Whether the thread is archived.
    pub archived: bool,
    /// Whether the thread is locked.
    pub locked: bool,
    /// Number of messages in the thread so far.
    pub message_count: u32,
}

/// A message posted in a thread.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// Author of the message.
    pub author_id: i64,
    /// Server the message was posted in.
    pub guild_id: i64,
    /// Message text.
    pub content: String,
    /// The containing thread.
    pub thread: ThreadInfo,
}

/// A command invocation.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext {
    /// User that invoked the command.
    pub user_id: i64,
    /// Server the command was invoked in.
    pub guild_id: i64,
}

/// One historical message read back from a thread.
#[derive(Debug, Clone)]
pub struct HistoryMessage {
    /// Author display name.
    pub author_name: String,
    /// Message text.
    pub content: String,
}

/// Severity of an out-of-band notice (rendered as an embed or similar).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational, e.g. a thread being closed.
    Info,
    /// Something worth flagging, e.g. an empty response.
    Warning,
    /// A failure the user should know about.
    Error,
}

/// An out-of-band notice for a channel or thread.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub text: String,
}

impl Notice {
    /// An informational notice.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    /// A warning notice.
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }

    /// An error notice.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Error surfaced by a gateway implementation.
#[derive(Debug, thiserror::Error)]
#[error("gateway error: {0}")]
pub struct GatewayError(pub String);

/// Outbound operations on the messaging platform.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// The bot's own user id on the platform.
    fn bot_user_id(&self) -> i64;

    /// Create a thread in the channel, owned by the bot.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the creation.
    async fn create_thread(&self, channel_id: i64, name: &str) -> Result<ThreadInfo, GatewayError>;

    /// Deliver plain text to a channel or thread.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    async fn send_message(&self, channel_id: i64, text: &str) -> Result<(), GatewayError>;

    /// Deliver a notice to a channel or thread.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    async fn send_notice(&self, channel_id: i64, notice: Notice) -> Result<(), GatewayError>;

    /// Read up to `limit` historical messages of a thread, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn thread_history(
        &self,
        thread_id: i64,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>, GatewayError>;

    /// Lock a thread so no further messages arrive in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the edit.
    async fn lock_thread(&self, thread_id: i64) -> Result<(), GatewayError>;
}
