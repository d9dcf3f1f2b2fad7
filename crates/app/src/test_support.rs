//! In-memory port implementations shared by the unit tests of this crate.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tambak_domain::aerator::{Aerator, AeratorSystemState};
use tambak_domain::error::TambakError;
use tambak_domain::sensor::SensorReading;
use tambak_domain::time::{Timestamp, now};

use crate::ports::{
    AeratorActuator, AeratorStateStore, SensorReadingSink, SensorReadingSource, StatePublisher,
};

pub struct InMemoryStateStore {
    state: Mutex<AeratorSystemState>,
    writes: AtomicUsize,
    /// Writes still allowed to succeed; `usize::MAX` means unlimited.
    allowed_writes: AtomicUsize,
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::with_state(AeratorSystemState::initial(now()))
    }
}

impl InMemoryStateStore {
    pub fn with_state(state: AeratorSystemState) -> Self {
        Self {
            state: Mutex::new(state),
            writes: AtomicUsize::new(0),
            allowed_writes: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        let allowed = if fail { 0 } else { usize::MAX };
        self.allowed_writes.store(allowed, Ordering::SeqCst);
    }

    /// Let the next `n` writes succeed, then fail every later one.
    pub fn fail_after(&self, n: usize) {
        self.allowed_writes.store(n, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> AeratorSystemState {
        self.state.lock().unwrap().clone()
    }
}

impl AeratorStateStore for InMemoryStateStore {
    async fn read(&self) -> Result<AeratorSystemState, TambakError> {
        Ok(self.snapshot())
    }

    async fn write(&self, state: AeratorSystemState) -> Result<AeratorSystemState, TambakError> {
        let allowed = self.allowed_writes.load(Ordering::SeqCst);
        if allowed == 0 {
            return Err(TambakError::Persistence(Box::new(std::io::Error::other(
                "disk full",
            ))));
        }
        if allowed != usize::MAX {
            self.allowed_writes.store(allowed - 1, Ordering::SeqCst);
        }
        *self.state.lock().unwrap() = state.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(state)
    }
}

#[derive(Default)]
pub struct RecordingActuator {
    applied: AtomicUsize,
    fail: AtomicBool,
    delay: Option<Duration>,
}

impl RecordingActuator {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl AeratorActuator for RecordingActuator {
    async fn apply(&self, _aerators: &[Aerator]) -> Result<(), TambakError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(TambakError::Actuator(Box::new(std::io::Error::other(
                "no ack",
            ))));
        }
        self.applied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<AeratorSystemState>>,
}

impl RecordingPublisher {
    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<AeratorSystemState> {
        self.published.lock().unwrap().last().cloned()
    }
}

impl StatePublisher for RecordingPublisher {
    async fn publish(&self, state: AeratorSystemState) -> Result<(), TambakError> {
        self.published.lock().unwrap().push(state);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryReadings {
    readings: Mutex<Vec<SensorReading>>,
}

impl InMemoryReadings {
    pub fn push(&self, reading: SensorReading) {
        self.readings.lock().unwrap().push(reading);
    }
}

impl SensorReadingSource for InMemoryReadings {
    async fn latest(&self) -> Result<Option<SensorReading>, TambakError> {
        let readings = self.readings.lock().unwrap();
        Ok(readings.iter().max_by_key(|r| r.recorded_at).cloned())
    }

    async fn history(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: usize,
    ) -> Result<Vec<SensorReading>, TambakError> {
        let mut matching: Vec<SensorReading> = self
            .readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.recorded_at >= from && r.recorded_at <= to)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        matching.truncate(limit);
        Ok(matching)
    }
}

impl SensorReadingSink for InMemoryReadings {
    async fn record(&self, reading: SensorReading) -> Result<SensorReading, TambakError> {
        self.push(reading.clone());
        Ok(reading)
    }
}
