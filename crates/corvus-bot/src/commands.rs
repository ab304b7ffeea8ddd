//! Command handlers.
//!
//! Each command runs the authorization gate first and returns the reply
//! text to post. Store failures never reach the user raw: they are logged
//! with the command name and replaced with a generic error reply.

use corvus_core::{ChatHistory, ChatMessage, ModelParams, Privilege, ResponseStatus, ROLE_USER};

use crate::access::{self, check_all, AccessRule, Verdict};
use crate::error::BotError;
use crate::gateway::{CommandContext, Gateway};
use crate::handler;
use crate::llm;
use crate::state::AppState;

/// Reply for an unexpected internal failure.
pub const INTERNAL_ERROR_REPLY: &str =
    "**ERROR** - An internal error occurred. Please try again later.";

/// Reply for a non-positive limit argument.
pub const NEGATIVE_LIMIT_REPLY: &str =
    "**ERROR** - Please specify a positive integer for the limit.";

/// Shown in place of a number when no quota applies.
const UNLIMITED: &str = "∞";

/// Platform cap on thread names; the prompt is truncated to fit.
const MAX_THREAD_NAME_CHARS: usize = 100;

fn run(command: &str, result: Result<String, BotError>) -> String {
    match result {
        Ok(reply) => reply,
        Err(err) => {
            tracing::error!(command, error = %err, "command failed");
            INTERNAL_ERROR_REPLY.to_string()
        }
    }
}

/// Start a new conversation thread from a prompt.
///
/// The only path that creates a conversation: a thread is opened on the
/// platform, registered with the chosen parameters and the configured
/// system prompt, and the first reply is generated and posted in it. Usage
/// is counted once when that first generation succeeds.
pub async fn start_conversation(
    state: &AppState,
    gateway: &dyn Gateway,
    ctx: CommandContext,
    channel_id: i64,
    prompt: &str,
    params: ModelParams,
) -> String {
    run(
        "start_conversation",
        try_start_conversation(state, gateway, ctx, channel_id, prompt, params).await,
    )
}

async fn try_start_conversation(
    state: &AppState,
    gateway: &dyn Gateway,
    ctx: CommandContext,
    channel_id: i64,
    prompt: &str,
    params: ModelParams,
) -> Result<String, BotError> {
    let rules = [
        AccessRule::AuthorizedServer,
        AccessRule::NotBlocked,
        AccessRule::DailyUsageLeft,
    ];
    if let Verdict::Deny(reason) = check_all(&rules, state, ctx).await? {
        return Ok(reason);
    }

    let name: String = prompt.chars().take(MAX_THREAD_NAME_CHARS).collect();
    let thread = gateway.create_thread(channel_id, &name).await?;
    state.conversations.start(
        thread.id,
        state.config.chat_system_prompt.clone(),
        params.clone(),
    );
    tracing::info!(
        thread_id = thread.id,
        user_id = ctx.user_id,
        provider = params.provider.as_str(),
        model = %params.model,
        "conversation started"
    );

    let history = ChatHistory::new(vec![ChatMessage::new(ROLE_USER, prompt)]);
    let result = llm::generate(state, &state.config.chat_system_prompt, &history, &params).await;

    if result.status == ResponseStatus::Success {
        state.usage.increment_usage(ctx.user_id).await?;
    }
    handler::send_result(state, gateway, thread.id, result).await?;

    Ok(format!("Started a new thread: {name}"))
}

/// Set the server-wide default daily limit.
pub async fn set_default_limit(state: &AppState, ctx: CommandContext, limit: i64) -> String {
    run(
        "set_default_limit",
        try_set_default_limit(state, ctx, limit).await,
    )
}

async fn try_set_default_limit(
    state: &AppState,
    ctx: CommandContext,
    limit: i64,
) -> Result<String, BotError> {
    let rules = [AccessRule::AuthorizedServer, AccessRule::AdminUser];
    if let Verdict::Deny(reason) = check_all(&rules, state, ctx).await? {
        return Ok(reason);
    }
    if limit < 0 {
        return Ok(NEGATIVE_LIMIT_REPLY.to_string());
    }

    state.usage.set_default_daily_limit(limit).await?;
    tracing::info!(admin_id = ctx.user_id, limit, "default daily limit updated");
    Ok(format!("Set the daily usage limit to {limit}/day."))
}

/// Report the caller's usage against their limit.
pub async fn check_limit(state: &AppState, ctx: CommandContext) -> String {
    run("check_limit", try_check_limit(state, ctx).await)
}

async fn try_check_limit(state: &AppState, ctx: CommandContext) -> Result<String, BotError> {
    let rules = [AccessRule::AuthorizedServer, AccessRule::NotBlocked];
    if let Verdict::Deny(reason) = check_all(&rules, state, ctx).await? {
        return Ok(reason);
    }

    let usage = state.usage.user_daily_usage(ctx.user_id).await?;
    let unlimited =
        access::is_admin(state, ctx.user_id) || access::is_advanced(state, ctx.user_id).await?;

    let (limit_text, remaining_text) = if unlimited {
        (UNLIMITED.to_string(), UNLIMITED.to_string())
    } else {
        let limit = state.usage.user_daily_limit(ctx.user_id).await?;
        (limit.to_string(), (limit - usage).max(0).to_string())
    };

    Ok(format!(
        "Usage today: {usage} / {limit_text} (remaining: {remaining_text})\n\
         Usage is reset at 00:00 every day."
    ))
}

/// Grant a privilege to a user.
pub async fn grant_access(
    state: &AppState,
    ctx: CommandContext,
    user_id: i64,
    privilege: Privilege,
) -> String {
    run(
        "grant_access",
        try_grant_access(state, ctx, user_id, privilege).await,
    )
}

async fn try_grant_access(
    state: &AppState,
    ctx: CommandContext,
    user_id: i64,
    privilege: Privilege,
) -> Result<String, BotError> {
    let rules = [AccessRule::AuthorizedServer, AccessRule::AdminUser];
    if let Verdict::Deny(reason) = check_all(&rules, state, ctx).await? {
        return Ok(reason);
    }

    state.access.enable(user_id, privilege).await?;
    tracing::info!(
        admin_id = ctx.user_id,
        user_id,
        privilege = privilege.as_str(),
        "privilege granted"
    );
    Ok(format!(
        "Granted `{}` to user {user_id}.",
        privilege.as_str()
    ))
}

/// Revoke a privilege from a user.
pub async fn revoke_access(
    state: &AppState,
    ctx: CommandContext,
    user_id: i64,
    privilege: Privilege,
) -> String {
    run(
        "revoke_access",
        try_revoke_access(state, ctx, user_id, privilege).await,
    )
}

async fn try_revoke_access(
    state: &AppState,
    ctx: CommandContext,
    user_id: i64,
    privilege: Privilege,
) -> Result<String, BotError> {
    let rules = [AccessRule::AuthorizedServer, AccessRule::AdminUser];
    if let Verdict::Deny(reason) = check_all(&rules, state, ctx).await? {
        return Ok(reason);
    }

    state.access.disable(user_id, privilege).await?;
    tracing::info!(
        admin_id = ctx.user_id,
        user_id,
        privilege = privilege.as_str(),
        "privilege revoked"
    );
    Ok(format!(
        "Revoked `{}` from user {user_id}.",
        privilege.as_str()
    ))
}

/// Report the active privileges of a user.
pub async fn check_access(state: &AppState, ctx: CommandContext, user_id: i64) -> String {
    run("check_access", try_check_access(state, ctx, user_id).await)
}

async fn try_check_access(
    state: &AppState,
    ctx: CommandContext,
    user_id: i64,
) -> Result<String, BotError> {
    let rules = [AccessRule::AuthorizedServer, AccessRule::AdminUser];
    if let Verdict::Deny(reason) = check_all(&rules, state, ctx).await? {
        return Ok(reason);
    }

    let mut held = Vec::new();
    for privilege in [Privilege::Advanced, Privilege::Blocked] {
        if state.access.has_privilege(user_id, privilege).await? {
            held.push(privilege.as_str());
        }
    }

    if held.is_empty() {
        Ok(format!("User {user_id} has no special privileges."))
    } else {
        Ok(format!(
            "User {user_id} has privileges: {}.",
            held.join(", ")
        ))
    }
}
