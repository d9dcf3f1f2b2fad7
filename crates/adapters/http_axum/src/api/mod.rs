//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod aerators;
#[allow(clippy::missing_errors_doc)]
pub mod mode;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};
use serde::Serialize;

use tambak_app::ports::{AeratorActuator, AeratorStateStore, SensorReadingSink, SensorReadingSource};
use tambak_domain::aerator::AeratorSystemState;

use crate::state::AppState;

/// Aerator state as rendered to clients, with the derived display fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    #[serde(flatten)]
    pub state: AeratorSystemState,
    pub is_auto_mode: bool,
    pub status: String,
}

impl From<AeratorSystemState> for StateView {
    fn from(state: AeratorSystemState) -> Self {
        Self {
            is_auto_mode: state.mode.is_auto(),
            status: state.status_label(),
            state,
        }
    }
}

/// Build the `/api` sub-router.
pub fn routes<S, A, R>() -> Router<AppState<S, A, R>>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    Router::new()
        // Aerators
        .route("/aerators", get(aerators::list::<S, A, R>))
        .route("/aerators/toggle-all", post(aerators::toggle_all::<S, A, R>))
        .route("/aerators/{id}/toggle", post(aerators::toggle::<S, A, R>))
        // Mode
        .route(
            "/mode",
            get(mode::get::<S, A, R>).post(mode::switch::<S, A, R>),
        )
        // Sensors
        .route("/sensors", post(sensors::ingest::<S, A, R>))
        .route("/sensors/latest", get(sensors::latest::<S, A, R>))
        .route("/sensors/history", get(sensors::history::<S, A, R>))
        // Push
        .route("/events", get(sse::stream::<S, A, R>))
}
