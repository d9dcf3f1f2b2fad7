//! In-memory ports and request helpers for the handler tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use tambak_app::broadcast_hub::BroadcastHub;
use tambak_app::ports::{AeratorActuator, AeratorStateStore, SensorReadingSink, SensorReadingSource};
use tambak_app::services::aerator_controller::AeratorController;
use tambak_app::services::auto_policy::AutoPolicyRunner;
use tambak_app::services::sensor_service::SensorService;
use tambak_domain::aerator::{Aerator, AeratorSystemState};
use tambak_domain::error::TambakError;
use tambak_domain::sensor::SensorReading;
use tambak_domain::time::{Timestamp, now};

use crate::state::AppState;

pub struct FakeStore {
    state: Mutex<AeratorSystemState>,
    writes: AtomicUsize,
    fail: AtomicBool,
}

impl FakeStore {
    fn new(state: AeratorSystemState) -> Self {
        Self {
            state: Mutex::new(state),
            writes: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> AeratorSystemState {
        self.state.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl AeratorStateStore for FakeStore {
    async fn read(&self) -> Result<AeratorSystemState, TambakError> {
        Ok(self.snapshot())
    }

    async fn write(&self, state: AeratorSystemState) -> Result<AeratorSystemState, TambakError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TambakError::Persistence(Box::new(std::io::Error::other(
                "database is locked",
            ))));
        }
        *self.state.lock().unwrap() = state.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(state)
    }
}

#[derive(Default)]
pub struct FakeActuator {
    fail: AtomicBool,
}

impl FakeActuator {
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl AeratorActuator for FakeActuator {
    async fn apply(&self, _aerators: &[Aerator]) -> Result<(), TambakError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TambakError::Actuator(Box::new(std::io::Error::other(
                "relay timeout",
            ))));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeReadings {
    readings: Mutex<Vec<SensorReading>>,
}

impl SensorReadingSource for FakeReadings {
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
        let mut found: Vec<SensorReading> = self
            .readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.recorded_at >= from && r.recorded_at <= to)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        found.truncate(limit);
        Ok(found)
    }
}

impl SensorReadingSink for FakeReadings {
    async fn record(&self, reading: SensorReading) -> Result<SensorReading, TambakError> {
        self.readings.lock().unwrap().push(reading.clone());
        Ok(reading)
    }
}

type TestState = AppState<Arc<FakeStore>, Arc<FakeActuator>, Arc<FakeReadings>>;

pub struct TestApp {
    pub store: Arc<FakeStore>,
    pub actuator: Arc<FakeActuator>,
    pub hub: Arc<BroadcastHub>,
    state: TestState,
}

impl TestApp {
    pub fn router(&self) -> Router {
        crate::router::build(self.state.clone())
    }
}

pub fn test_app() -> TestApp {
    let initial = AeratorSystemState::initial(now());
    let store = Arc::new(FakeStore::new(initial.clone()));
    let actuator = Arc::new(FakeActuator::default());
    let readings = Arc::new(FakeReadings::default());
    let hub = Arc::new(BroadcastHub::new(16, initial));

    let controller = Arc::new(AeratorController::new(
        Arc::clone(&store),
        Arc::clone(&actuator),
        Arc::clone(&hub),
    ));
    let policy = Arc::new(AutoPolicyRunner::new(
        Arc::clone(&controller),
        Arc::clone(&readings),
    ));
    let sensors = Arc::new(SensorService::new(readings));
    let state = AppState::from_arcs(controller, policy, sensors, Arc::clone(&hub));

    TestApp {
        store,
        actuator,
        hub,
        state,
    }
}

pub async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: &serde_json::Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
