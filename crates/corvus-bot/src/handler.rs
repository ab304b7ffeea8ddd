//! Thread message handling.
//!
//! One inbound event runs the full pipeline in order: relevance filter,
//! context-window check, quota gate, history fetch, generation, usage
//! accounting, chunked reply. Failures are caught at the top of the
//! pipeline and turned into a generic error notice so the process never
//! crashes on a single bad event.

use corvus_core::{split_into_chunks, ChatHistory, ChatMessage, ResponseResult, ResponseStatus};

use crate::access::{self, DENIAL_QUOTA_EXCEEDED};
use crate::error::BotError;
use crate::gateway::{Gateway, MessageEvent, Notice};
use crate::llm;
use crate::state::AppState;

/// Notice posted when a thread hits the context window and gets locked.
pub const THREAD_CLOSED_NOTICE: &str =
    "This thread has reached the context limit and is now closed. Start a new thread to continue.";

/// Notice posted when the handler fails for an unexpected reason.
pub const HANDLER_FAILURE_NOTICE: &str = "An error occurred while handling the thread.";

/// Notice posted when generation itself failed.
pub const GENERATION_FAILED_NOTICE: &str = "Response generation failed.";

/// Notice posted when generation succeeded but produced no text.
pub const EMPTY_RESPONSE_NOTICE: &str = "The model returned an empty response.";

/// Notice posted when the provider flagged the request.
pub const MODERATION_NOTICE: &str = "The request was flagged by content moderation.";

/// Entry point for a posted thread message.
///
/// Never returns an error: any failure below is logged and reported to the
/// thread as a generic error notice.
pub async fn on_message_posted(state: &AppState, gateway: &dyn Gateway, event: MessageEvent) {
    let thread_id = event.thread.id;
    if let Err(err) = handle_thread_message(state, gateway, &event).await {
        tracing::error!(thread_id, author_id = event.author_id, error = %err, "thread handler failed");
        let notice = Notice::error(HANDLER_FAILURE_NOTICE);
        if let Err(send_err) = gateway.send_notice(thread_id, notice).await {
            tracing::error!(thread_id, error = %send_err, "failed to deliver error notice");
        }
    }
}

async fn handle_thread_message(
    state: &AppState,
    gateway: &dyn Gateway,
    event: &MessageEvent,
) -> Result<(), BotError> {
    if !is_relevant(state, gateway, event).await? {
        return Ok(());
    }

    let thread = &event.thread;
    let Some(conversation) = state.conversations.get(thread.id) else {
        tracing::debug!(thread_id = thread.id, "no active conversation for thread");
        return Ok(());
    };

    if thread.message_count > state.config.chat_context_window {
        tracing::info!(
            thread_id = thread.id,
            message_count = thread.message_count,
            "thread exceeded context window, closing"
        );
        gateway
            .send_notice(thread.id, Notice::info(THREAD_CLOSED_NOTICE))
            .await?;
        gateway.lock_thread(thread.id).await?;
        state.conversations.end(thread.id);
        return Ok(());
    }

    if !access::has_daily_usage_left(state, event.author_id).await? {
        tracing::info!(
            thread_id = thread.id,
            author_id = event.author_id,
            "daily quota exhausted"
        );
        gateway
            .send_notice(thread.id, Notice::error(DENIAL_QUOTA_EXCEEDED))
            .await?;
        return Ok(());
    }

    let history =
        conversation_history(gateway, thread.id, state.config.chat_context_window).await?;
    let result = llm::generate(
        state,
        &conversation.system_prompt,
        &history,
        &conversation.params,
    )
    .await;

    // Failed generations never count against the quota.
    if result.status == ResponseStatus::Success {
        state.usage.increment_usage(event.author_id).await?;
    }

    send_result(state, gateway, thread.id, result).await?;
    Ok(())
}

/// Whether the event is one this bot should answer.
///
/// The bot's own messages, blocked users, threads it does not own, and
/// archived or locked threads are all ignored without a reply.
async fn is_relevant(
    state: &AppState,
    gateway: &dyn Gateway,
    event: &MessageEvent,
) -> Result<bool, BotError> {
    let bot_id = gateway.bot_user_id();
    if event.author_id == bot_id {
        return Ok(false);
    }
    if event.thread.owner_id != bot_id {
        return Ok(false);
    }
    if event.thread.archived || event.thread.locked {
        return Ok(false);
    }
    if access::is_blocked(state, event.author_id).await? {
        tracing::debug!(author_id = event.author_id, "ignoring blocked user");
        return Ok(false);
    }
    Ok(true)
}

/// Read the thread back as an oldest-first chat history.
async fn conversation_history(
    gateway: &dyn Gateway,
    thread_id: i64,
    limit: u32,
) -> Result<ChatHistory, BotError> {
    let mut messages: Vec<ChatMessage> = gateway
        .thread_history(thread_id, limit)
        .await?
        .into_iter()
        .map(|m| ChatMessage::new(m.author_name, m.content))
        .collect();
    // The platform returns newest first.
    messages.reverse();
    Ok(ChatHistory::new(messages))
}

/// Deliver the generation outcome to the thread.
pub(crate) async fn send_result(
    state: &AppState,
    gateway: &dyn Gateway,
    thread_id: i64,
    result: ResponseResult,
) -> Result<(), BotError> {
    match result.status {
        ResponseStatus::Success => {
            let text = result.text.unwrap_or_default();
            if text.is_empty() {
                gateway
                    .send_notice(thread_id, Notice::warning(EMPTY_RESPONSE_NOTICE))
                    .await?;
                return Ok(());
            }
            for chunk in split_into_chunks(&text, state.config.max_chars_per_message) {
                gateway.send_message(thread_id, &chunk).await?;
            }
        }
        ResponseStatus::ModerationFlagged => {
            gateway
                .send_notice(thread_id, Notice::warning(MODERATION_NOTICE))
                .await?;
        }
        ResponseStatus::Error => {
            gateway
                .send_notice(thread_id, Notice::error(GENERATION_FAILED_NOTICE))
                .await?;
        }
    }
    Ok(())
}
