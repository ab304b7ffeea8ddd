//! Conversation message model.
//!
//! Messages arrive from the platform with the author's display name as the
//! role; rendering maps those names onto the roles the LLM providers
//! understand.

use serde::{Deserialize, Serialize};

/// Wire role for the assistant's own turns.
pub const ROLE_ASSISTANT: &str = "assistant";

/// Wire role carrying the system instruction (OpenAI-style providers).
pub const ROLE_DEVELOPER: &str = "developer";

/// Wire role for everyone else.
pub const ROLE_USER: &str = "user";

/// A single conversation turn with a role and content.
///
/// `role` holds whatever the platform reported as the author, typically a
/// display name; it is normalized to a provider role only at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role or display name.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role and content.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Normalize this message for the wire.
    ///
    /// The bot's own display name maps to `assistant`; `developer` and
    /// `assistant` pass through; any other author is `user`.
    #[must_use]
    pub fn to_wire(&self, bot_name: &str) -> WireMessage {
        let role = if self.role == bot_name {
            ROLE_ASSISTANT
        } else if self.role == ROLE_DEVELOPER || self.role == ROLE_ASSISTANT {
            self.role.as_str()
        } else {
            ROLE_USER
        };
        WireMessage {
            role: role.to_string(),
            content: self.content.clone(),
        }
    }
}

/// A normalized message as sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// One of `user`, `assistant`, or `developer`.
    pub role: String,
    /// Message text.
    pub content: String,
}

/// An ordered collection of chat messages, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatHistory {
    /// The conversation turns.
    pub messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// Create a history from an ordered list of messages.
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Render every message for the wire.
    #[must_use]
    pub fn render(&self, bot_name: &str) -> Vec<WireMessage> {
        self.messages.iter().map(|m| m.to_wire(bot_name)).collect()
    }
}
