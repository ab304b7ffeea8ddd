//! Daily limit and usage counter storage.

use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::schema::{table, validate_table_name};

/// Sentinel `user_id` whose `daily_limit` row is the default for all
/// otherwise-unconfigured regular users.
pub const DEFAULT_LIMIT_USER_ID: i64 = 0;

/// Daily limit applied when no default row exists.
pub const FALLBACK_DAILY_LIMIT: i64 = 10;

/// Store for daily quotas and per-day usage counters.
#[derive(Debug, Clone)]
pub struct UsageStore {
    pool: SqlitePool,
    tz: Tz,
}

impl UsageStore {
    /// Create a store over the given pool, with dates computed in `tz`.
    #[must_use]
    pub fn new(pool: SqlitePool, tz: Tz) -> Self {
        Self { pool, tz }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Create the limit and counter tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::InvalidTableName`] if a table name
    /// fails validation, or a database error.
    pub async fn create_tables(&self) -> Result<()> {
        validate_table_name(table::DAILY_LIMIT)?;
        validate_table_name(table::USAGE_COUNTER)?;

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id      INTEGER NOT NULL UNIQUE,
                daily_limit  INTEGER NOT NULL DEFAULT 10,
                last_updated TIMESTAMP NOT NULL
            )",
            table::DAILY_LIMIT
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL,
                usage_date  DATE NOT NULL,
                usage_count INTEGER NOT NULL DEFAULT 0,
                UNIQUE(user_id, usage_date)
            )",
            table::USAGE_COUNTER
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        Ok(())
    }

    /// Set or update the default daily limit for all regular users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn set_default_daily_limit(&self, daily_limit: i64) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO daily_limit (user_id, daily_limit, last_updated)
             VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 daily_limit = excluded.daily_limit,
                 last_updated = excluded.last_updated",
        )
        .bind(DEFAULT_LIMIT_USER_ID)
        .bind(daily_limit)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::info!(daily_limit, "default daily limit updated");
        Ok(())
    }

    /// Get the default daily limit, or [`FALLBACK_DAILY_LIMIT`] if unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn default_daily_limit(&self) -> Result<i64> {
        let limit: Option<i64> =
            sqlx::query_scalar("SELECT daily_limit FROM daily_limit WHERE user_id = ?")
                .bind(DEFAULT_LIMIT_USER_ID)
                .fetch_optional(&self.pool)
                .await?;

        Ok(limit.unwrap_or(FALLBACK_DAILY_LIMIT))
    }

    /// Get the daily limit for a user: their override row if present,
    /// otherwise the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn user_daily_limit(&self, user_id: i64) -> Result<i64> {
        let limit: Option<i64> =
            sqlx::query_scalar("SELECT daily_limit FROM daily_limit WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match limit {
            Some(limit) => Ok(limit),
            None => self.default_daily_limit().await,
        }
    }

    /// Get today's usage count for a user, 0 if no row exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn user_daily_usage(&self, user_id: i64) -> Result<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT usage_count FROM usage_counter
             WHERE user_id = ? AND usage_date = ?",
        )
        .bind(user_id)
        .bind(self.today())
        .fetch_optional(&self.pool)
        .await?;

        Ok(count.unwrap_or(0))
    }

    /// Increment the user's counter for today.
    ///
    /// Atomic with respect to concurrent callers: the increment is SQLite's
    /// own conflict-resolution upsert, never read-then-write.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn increment_usage(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO usage_counter (user_id, usage_date, usage_count)
             VALUES (?, ?, 1)
             ON CONFLICT(user_id, usage_date) DO UPDATE SET
                 usage_count = usage_count + 1",
        )
        .bind(user_id)
        .bind(self.today())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete counter rows strictly older than yesterday.
    ///
    /// Yesterday's and today's rows survive: the reset never clears the
    /// current day's accumulated count at the boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn purge_stale_usage(&self) -> Result<()> {
        let yesterday = self
            .today()
            .checked_sub_days(Days::new(1))
            .unwrap_or_else(|| self.today());

        let result = sqlx::query("DELETE FROM usage_counter WHERE usage_date < ?")
            .bind(yesterday)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            rows_deleted = result.rows_affected(),
            cutoff = %yesterday,
            "purged stale usage counters"
        );
        Ok(())
    }
}
