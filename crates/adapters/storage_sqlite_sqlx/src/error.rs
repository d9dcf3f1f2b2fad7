//! Storage-specific error type wrapping sqlx errors.

use tambak_domain::error::TambakError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to encode or decode a stored JSON value.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An update matched no row.
    #[error("row {id} missing from table {table}")]
    MissingRow { table: &'static str, id: i64 },
}

impl From<StorageError> for TambakError {
    fn from(err: StorageError) -> Self {
        Self::Persistence(Box::new(err))
    }
}
