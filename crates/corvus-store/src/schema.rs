//! Table names and the DDL-interpolation guard.

use crate::error::{Result, StoreError};

/// Table names used by the stores.
pub mod table {
    /// Privilege activation intervals.
    pub const ACCESS_GRANT: &str = "access_grant";

    /// Per-user daily quotas; `user_id = 0` is the default row.
    pub const DAILY_LIMIT: &str = "daily_limit";

    /// Per-user, per-day usage counts.
    pub const USAGE_COUNTER: &str = "usage_counter";
}

/// Validate a table name before it is interpolated into DDL.
///
/// Names must be non-empty and match `^[A-Za-z0-9_]+$`. Values everywhere
/// else are bound parameters; table names are the one thing SQLite cannot
/// parameterize.
///
/// # Errors
///
/// Returns [`StoreError::InvalidTableName`] for a non-conforming name.
pub fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidTableName(name.to_string()))
    }
}
