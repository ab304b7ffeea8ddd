//! SQLite storage layer for corvus.
//!
//! This crate owns the three persisted tables:
//!
//! - `access_grant`: privilege activation intervals, keyed by row id
//! - `daily_limit`: per-user daily quotas (`user_id = 0` is the default)
//! - `usage_counter`: per-user, per-day usage counts
//!
//! Every accessor checks a pooled connection out for the duration of one
//! call; there are no long-held transactions and no cross-operation locks.
//! Concurrent counter increments rely on SQLite's native
//! `ON CONFLICT ... DO UPDATE` upsert.
//!
//! # Example
//!
//! ```no_run
//! use corvus_core::Privilege;
//! use corvus_store::AccessStore;
//!
//! # async fn example() -> corvus_store::Result<()> {
//! let pool = corvus_store::connect("corvus.db").await?;
//! let access = AccessStore::new(pool, chrono_tz::Asia::Tokyo);
//! access.create_table().await?;
//! access.enable(1234, Privilege::Advanced).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod access;
pub mod error;
pub mod schema;
pub mod usage;

pub use access::AccessStore;
pub use error::{Result, StoreError};
pub use usage::{UsageStore, DEFAULT_LIMIT_USER_ID, FALLBACK_DAILY_LIMIT};

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Open (or create) the SQLite database at the given path.
///
/// WAL mode keeps readers from blocking the single writer; the busy timeout
/// lets concurrent upserts queue instead of failing.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or created.
pub async fn connect(path: impl AsRef<Path>) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
