//! `SQLite` implementation of the sensor reading ports.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use tambak_app::ports::{SensorReadingSink, SensorReadingSource};
use tambak_domain::error::TambakError;
use tambak_domain::id::SensorReadingId;
use tambak_domain::sensor::SensorReading;
use tambak_domain::time::Timestamp;

use crate::error::StorageError;
use crate::pool::{decode_timestamp, encode_timestamp};

struct Wrapper(SensorReading);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let recorded_at: String = row.try_get("recorded_at")?;

        Ok(Self(SensorReading {
            id: SensorReadingId::from_uuid(id),
            temperature: row.try_get("temperature")?,
            turbidity: row.try_get("turbidity")?,
            ph: row.try_get("ph")?,
            quality_index: row.try_get("quality_index")?,
            recorded_at: decode_timestamp(&recorded_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO sensor_readings (id, temperature, turbidity, ph, quality_index, recorded_at)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_LATEST: &str = r"
    SELECT * FROM sensor_readings
    ORDER BY recorded_at DESC
    LIMIT 1
";

const SELECT_IN_RANGE: &str = r"
    SELECT * FROM sensor_readings
    WHERE recorded_at >= ? AND recorded_at <= ?
    ORDER BY recorded_at DESC
    LIMIT ?
";

/// `SQLite`-backed sensor reading repository.
pub struct SqliteSensorReadingRepository {
    pool: SqlitePool,
}

impl SqliteSensorReadingRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SensorReadingSource for SqliteSensorReadingRepository {
    async fn latest(&self) -> Result<Option<SensorReading>, TambakError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_LATEST)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn history(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> Result<Vec<SensorReading>, TambakError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_IN_RANGE)
            .bind(encode_timestamp(from))
            .bind(encode_timestamp(to))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

impl SensorReadingSink for SqliteSensorReadingRepository {
    async fn record(&self, reading: SensorReading) -> Result<SensorReading, TambakError> {
        sqlx::query(INSERT)
            .bind(reading.id.as_uuid())
            .bind(reading.temperature)
            .bind(reading.turbidity)
            .bind(reading.ph)
            .bind(reading.quality_index)
            .bind(encode_timestamp(reading.recorded_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(reading)
    }
}
