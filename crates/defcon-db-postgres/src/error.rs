//! Error types for the PostgreSQL storage backend.

use defcon_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for foreign key violations (23503).
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL error code for unique violations (23505).
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Maps a query failure to the storage error taxonomy.
pub fn query_error(context: &str, err: SqlxError) -> StorageError {
    if has_pg_error_code(&err, PG_FOREIGN_KEY_VIOLATION)
        || has_pg_error_code(&err, PG_UNIQUE_VIOLATION)
    {
        return StorageError::conflict(format!("{context}: {err}"));
    }
    match err {
        SqlxError::Io(_)
        | SqlxError::Tls(_)
        | SqlxError::PoolTimedOut
        | SqlxError::PoolClosed
        | SqlxError::WorkerCrashed => StorageError::connection_error(format!("{context}: {err}")),
        other => StorageError::internal(format!("{context}: {other}")),
    }
}

/// Errors specific to the PostgreSQL storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] SqlxError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StorageError::connection_error(e.to_string()),
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PostgresError::config("invalid URL");
        assert!(err.to_string().contains("Configuration error"));

        let err = PostgresError::Migration("checksum mismatch".into());
        assert_eq!(err.to_string(), "Migration error: checksum mismatch");
    }

    #[test]
    fn test_conversion_to_storage_error() {
        let storage_err: StorageError = PostgresError::config("test error").into();
        assert!(matches!(storage_err, StorageError::Internal { .. }));

        let storage_err: StorageError = PostgresError::Connection(SqlxError::PoolTimedOut).into();
        assert!(matches!(storage_err, StorageError::ConnectionError { .. }));
    }

    #[test]
    fn test_query_error_mapping() {
        let err = query_error("Failed to read component", SqlxError::PoolClosed);
        assert!(matches!(err, StorageError::ConnectionError { .. }));
        assert!(err.to_string().contains("Failed to read component"));

        let err = query_error("Failed to read component", SqlxError::RowNotFound);
        assert!(matches!(err, StorageError::Internal { .. }));
    }
}
