//! Access grant storage.
//!
//! A grant row is one (user, privilege) activation interval. `enable`
//! always inserts a new row, even when one is already open; `disable`
//! closes every matching row. Rows are never physically deleted.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use sqlx::SqlitePool;

use corvus_core::Privilege;

use crate::error::Result;
use crate::schema::{table, validate_table_name};

/// Store for user access privileges.
#[derive(Debug, Clone)]
pub struct AccessStore {
    pool: SqlitePool,
    tz: Tz,
}

impl AccessStore {
    /// Create a store over the given pool, with dates computed in `tz`.
    #[must_use]
    pub fn new(pool: SqlitePool, tz: Tz) -> Self {
        Self { pool, tz }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Create the grant table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::InvalidTableName`] if the table name
    /// fails validation, or a database error.
    pub async fn create_table(&self) -> Result<()> {
        validate_table_name(table::ACCESS_GRANT)?;

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL,
                privilege   TEXT NOT NULL,
                enabled_at  DATE NOT NULL,
                disabled_at DATE DEFAULT NULL
            )",
            table::ACCESS_GRANT
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        Ok(())
    }

    /// Open a new grant for the user.
    ///
    /// Always inserts a fresh row; duplicate open grants are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn enable(&self, user_id: i64, privilege: Privilege) -> Result<()> {
        sqlx::query(
            "INSERT INTO access_grant (user_id, privilege, enabled_at)
             VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(privilege.as_str())
        .bind(self.today())
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id, privilege = privilege.as_str(), "access grant opened");
        Ok(())
    }

    /// Close every grant matching the user and privilege.
    ///
    /// No filter on already-closed rows: closing is idempotent, and if
    /// duplicate open rows exist they all get today's `disabled_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn disable(&self, user_id: i64, privilege: Privilege) -> Result<()> {
        sqlx::query(
            "UPDATE access_grant SET disabled_at = ?
             WHERE user_id = ? AND privilege = ?",
        )
        .bind(self.today())
        .bind(user_id)
        .bind(privilege.as_str())
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id, privilege = privilege.as_str(), "access grant closed");
        Ok(())
    }

    /// Fetch the IDs of all users with an active grant for `privilege`.
    ///
    /// Each user appears once even when duplicate open rows exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn user_ids_with_privilege(&self, privilege: Privilege) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT DISTINCT user_id FROM access_grant
             WHERE privilege = ? AND disabled_at IS NULL",
        )
        .bind(privilege.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Whether the user currently holds an active grant for `privilege`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn has_privilege(&self, user_id: i64, privilege: Privilege) -> Result<bool> {
        let row: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM access_grant
             WHERE user_id = ? AND privilege = ? AND disabled_at IS NULL
             LIMIT 1",
        )
        .bind(user_id)
        .bind(privilege.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }
}
