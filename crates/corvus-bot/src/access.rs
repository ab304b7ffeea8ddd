//! Authorization predicates and the pre-dispatch gate.
//!
//! Each rule takes the event context and answers allow, or deny with a
//! user-visible message. A gate is an ordered list of rules evaluated
//! before a handler body; the first denial wins. Denials are ephemeral
//! rejections, never logged as errors, and mutate no state.

use corvus_core::Privilege;

use crate::error::BotError;
use crate::gateway::CommandContext;
use crate::state::AppState;

/// Denial shown for failed authorization checks.
pub const DENIAL_NOT_PERMITTED: &str = "You do not have permission to use this command.";

/// Denial shown when the daily quota is exhausted. Distinct from
/// authorization denials.
pub const DENIAL_QUOTA_EXCEEDED: &str =
    "You have reached the usage limit for today. It will be reset at 00:00.";

/// Outcome of one rule or a whole gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The rule passed.
    Allow,
    /// The rule failed, with the message to show the user.
    Deny(String),
}

impl Verdict {
    /// Whether this verdict allows the action.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// One authorization predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// The server must be in the static allow-list.
    AuthorizedServer,
    /// The user must be in the static admin allow-list.
    AdminUser,
    /// The user must not hold an active `blocked` grant.
    NotBlocked,
    /// The user must have daily quota left (admins and advanced users
    /// bypass unconditionally).
    DailyUsageLeft,
}

impl AccessRule {
    /// Evaluate this rule against the invoking user and server.
    ///
    /// # Errors
    ///
    /// Returns an error if a backing store query fails; store failures are
    /// fatal for the single triggering event, never retried.
    pub async fn evaluate(
        self,
        state: &AppState,
        ctx: CommandContext,
    ) -> Result<Verdict, BotError> {
        let allowed = match self {
            Self::AuthorizedServer => state.config.authorized_server_ids.contains(&ctx.guild_id),
            Self::AdminUser => is_admin(state, ctx.user_id),
            Self::NotBlocked => !is_blocked(state, ctx.user_id).await?,
            Self::DailyUsageLeft => {
                return Ok(if has_daily_usage_left(state, ctx.user_id).await? {
                    Verdict::Allow
                } else {
                    Verdict::Deny(DENIAL_QUOTA_EXCEEDED.to_string())
                });
            }
        };

        Ok(if allowed {
            Verdict::Allow
        } else {
            Verdict::Deny(DENIAL_NOT_PERMITTED.to_string())
        })
    }
}

/// Run an ordered list of rules; the first denial short-circuits.
///
/// # Errors
///
/// Returns an error if a backing store query fails.
pub async fn check_all(
    rules: &[AccessRule],
    state: &AppState,
    ctx: CommandContext,
) -> Result<Verdict, BotError> {
    for rule in rules {
        let verdict = rule.evaluate(state, ctx).await?;
        if !verdict.is_allow() {
            return Ok(verdict);
        }
    }
    Ok(Verdict::Allow)
}

/// Whether the user is in the static admin allow-list.
#[must_use]
pub fn is_admin(state: &AppState, user_id: i64) -> bool {
    state.config.admin_user_ids.contains(&user_id)
}

/// Whether the user holds an active `advanced` grant.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub async fn is_advanced(state: &AppState, user_id: i64) -> Result<bool, BotError> {
    Ok(state.access.has_privilege(user_id, Privilege::Advanced).await?)
}

/// Whether the user is effectively blocked.
///
/// A user may hold `advanced` and `blocked` at once; the configured
/// tie-break decides whether `advanced` exempts them from the block.
///
/// # Errors
///
/// Returns an error if a store query fails.
pub async fn is_blocked(state: &AppState, user_id: i64) -> Result<bool, BotError> {
    let blocked = state.access.has_privilege(user_id, Privilege::Blocked).await?;
    if !blocked {
        return Ok(false);
    }
    if state.config.advanced_overrides_block && is_advanced(state, user_id).await? {
        return Ok(false);
    }
    Ok(true)
}

/// The quota decision rule.
///
/// Allowed iff `current_usage < daily_limit`, unless the user is an admin
/// or holds `advanced`, in which case the check is bypassed regardless of
/// usage.
///
/// # Errors
///
/// Returns an error if a store query fails.
pub async fn has_daily_usage_left(state: &AppState, user_id: i64) -> Result<bool, BotError> {
    if is_admin(state, user_id) {
        return Ok(true);
    }
    if is_advanced(state, user_id).await? {
        return Ok(true);
    }

    let current_usage = state.usage.user_daily_usage(user_id).await?;
    let user_limit = state.usage.user_daily_limit(user_id).await?;

    Ok(current_usage < user_limit)
}
