//! `SQLite` connection pool setup and migration runner.

use std::str::FromStr;

use chrono::SecondsFormat;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use tambak_domain::time::Timestamp;

use crate::error::StorageError;

/// Configuration for the `SQLite` storage adapter.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:tambak.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// Build a [`Database`] from this configuration.
    ///
    /// Creates the connection pool, creates the database file if missing,
    /// and runs all pending migrations. A fresh database is seeded with
    /// eight aerators, all off, in manual mode.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the connection or migrations fail.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::initialize(&self.database_url).await
    }
}

/// Holds the `SQLite` connection pool and provides access to it.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn initialize(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Fixed-width RFC 3339 encoding so that text comparison orders by time.
pub(crate) fn encode_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    tambak_domain::time::parse_rfc3339(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tambak_domain::time::parse_rfc3339;

    #[tokio::test]
    async fn should_create_pool_and_run_migrations_when_using_memory_db() {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
        };
        let db = config.build().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|row| row.0.as_str()).collect();
        assert!(names.contains(&"aerators"), "missing aerators table");
        assert!(names.contains(&"aerator_system"), "missing aerator_system table");
        assert!(names.contains(&"sensor_readings"), "missing sensor_readings table");
    }

    #[tokio::test]
    async fn should_seed_eight_aerators() {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM aerators WHERE status = 0")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 8);
    }

    #[test]
    fn should_encode_timestamps_with_fixed_width() {
        let a = parse_rfc3339("2025-06-01T08:30:00Z").unwrap();
        let b = parse_rfc3339("2025-06-01T08:30:00.5Z").unwrap();
        assert_eq!(encode_timestamp(a), "2025-06-01T08:30:00.000000Z");
        assert!(encode_timestamp(a) < encode_timestamp(b));
        assert_eq!(decode_timestamp(&encode_timestamp(b)).unwrap(), b);
    }
}
