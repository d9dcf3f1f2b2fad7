//! Sensor ports — where probe readings are read from and recorded to.

use std::future::Future;

use tambak_domain::error::TambakError;
use tambak_domain::sensor::SensorReading;
use tambak_domain::time::Timestamp;

/// Read side of the sensor store. The auto policy only needs this half.
pub trait SensorReadingSource {
    /// Most recent reading, if any has been recorded.
    fn latest(&self) -> impl Future<Output = Result<Option<SensorReading>, TambakError>> + Send;

    /// Readings with `from <= recorded_at <= to`, newest first, at most `limit`.
    fn history(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SensorReading>, TambakError>> + Send;
}

/// Write side of the sensor store.
pub trait SensorReadingSink {
    /// Store a validated reading.
    fn record(
        &self,
        reading: SensorReading,
    ) -> impl Future<Output = Result<SensorReading, TambakError>> + Send;
}

impl<T: SensorReadingSource + Send + Sync> SensorReadingSource for std::sync::Arc<T> {
    fn latest(&self) -> impl Future<Output = Result<Option<SensorReading>, TambakError>> + Send {
        (**self).latest()
    }

    fn history(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SensorReading>, TambakError>> + Send {
        (**self).history(from, to, limit)
    }
}

impl<T: SensorReadingSink + Send + Sync> SensorReadingSink for std::sync::Arc<T> {
    fn record(
        &self,
        reading: SensorReading,
    ) -> impl Future<Output = Result<SensorReading, TambakError>> + Send {
        (**self).record(reading)
    }
}
