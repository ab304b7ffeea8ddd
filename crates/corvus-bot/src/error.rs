//! Bot error types.

use crate::gateway::GatewayError;
use crate::llm::CompletionError;

/// Errors that can occur while handling an event.
///
/// Failures are contained at the boundary of the single triggering event;
/// nothing here is retried and nothing crosses into other events.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Storage operation failed.
    #[error("store error: {0}")]
    Store(#[from] corvus_store::StoreError),

    /// LLM provider call failed.
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Messaging platform operation failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
