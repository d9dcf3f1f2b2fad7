//! Use-cases for probe readings.

use chrono::Duration;

use tambak_domain::error::{NotFoundError, TambakError, ValidationError};
use tambak_domain::id::SensorReadingId;
use tambak_domain::sensor::SensorReading;
use tambak_domain::time::{Timestamp, now};

use crate::ports::{SensorReadingSink, SensorReadingSource};

/// Number of readings returned by a history query without an explicit limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Upper bound on a history query's limit.
pub const MAX_HISTORY_LIMIT: usize = 1000;

/// Window covered by a history query without an explicit start.
const DEFAULT_HISTORY_WINDOW_HOURS: i64 = 24;

/// A history query as received from a client. Every field is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryQuery {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<usize>,
}

/// A reading as submitted by a probe, before it gets an id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewReading {
    pub temperature: Option<f64>,
    pub turbidity: Option<f64>,
    pub ph: Option<f64>,
    pub quality_index: Option<f64>,
    pub recorded_at: Option<Timestamp>,
}

/// Application service over the sensor store.
pub struct SensorService<R> {
    repo: R,
}

impl<R> SensorService<R>
where
    R: SensorReadingSource + SensorReadingSink,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The most recent reading.
    ///
    /// # Errors
    ///
    /// Returns [`TambakError::NotFound`] when nothing has been recorded, or a
    /// storage error.
    pub async fn latest(&self) -> Result<SensorReading, TambakError> {
        self.repo.latest().await?.ok_or_else(|| {
            NotFoundError {
                entity: "SensorReading",
                id: "latest".to_string(),
            }
            .into()
        })
    }

    /// Readings in a time window, newest first.
    ///
    /// Defaults: `to` is now, `from` is 24 hours before `to`, `limit` is
    /// [`DEFAULT_HISTORY_LIMIT`]. The limit is clamped to
    /// `1..=MAX_HISTORY_LIMIT`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvertedRange`] when `from > to`, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn history(&self, query: HistoryQuery) -> Result<Vec<SensorReading>, TambakError> {
        let to = query.to.unwrap_or_else(now);
        let from = query
            .from
            .unwrap_or(to - Duration::hours(DEFAULT_HISTORY_WINDOW_HOURS));
        if from > to {
            return Err(ValidationError::InvertedRange.into());
        }
        let limit = query
            .limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.repo.history(from, to, limit).await
    }

    /// Validate and store a new reading.
    ///
    /// # Errors
    ///
    /// Returns [`TambakError::InvalidInput`] for implausible values, or a
    /// storage error.
    #[tracing::instrument(skip(self, reading))]
    pub async fn record(&self, reading: NewReading) -> Result<SensorReading, TambakError> {
        let reading = SensorReading {
            id: SensorReadingId::new(),
            temperature: reading.temperature,
            turbidity: reading.turbidity,
            ph: reading.ph,
            quality_index: reading.quality_index,
            recorded_at: reading.recorded_at.unwrap_or_else(now),
        };
        reading.validate()?;
        let stored = self.repo.record(reading).await?;
        tracing::debug!(id = %stored.id, "sensor reading recorded");
        Ok(stored)
    }
}
