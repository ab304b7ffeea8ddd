//! Error types for corvus storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A table name failed validation before DDL interpolation.
    ///
    /// Table names cannot be bound as parameters, so this check is the sole
    /// injection-prevention control for DDL.
    #[error("invalid table name {0:?}: only alphanumeric characters and underscores are allowed")]
    InvalidTableName(String),
}
