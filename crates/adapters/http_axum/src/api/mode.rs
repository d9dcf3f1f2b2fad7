//! JSON REST handlers for the operating mode.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use tambak_app::ports::{AeratorActuator, AeratorStateStore, SensorReadingSink, SensorReadingSource};
use tambak_domain::aerator::{AeratorSystemState, AutoReason, Mode};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for switching mode.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchModeRequest {
    pub is_auto_mode: bool,
}

/// Mode summary without the per-aerator list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeView {
    pub is_auto_mode: bool,
    pub mode: Mode,
    pub auto_activated: bool,
    pub auto_activation_reason: Vec<AutoReason>,
    pub status: String,
}

impl From<&AeratorSystemState> for ModeView {
    fn from(state: &AeratorSystemState) -> Self {
        Self {
            is_auto_mode: state.mode.is_auto(),
            mode: state.mode,
            auto_activated: state.auto_activated,
            auto_activation_reason: state.auto_activation_reason.iter().copied().collect(),
            status: state.status_label(),
        }
    }
}

/// Possible responses from the mode endpoints.
pub enum ModeResponse {
    Ok(Json<ModeView>),
}

impl IntoResponse for ModeResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/mode`
pub async fn get<S, A, R>(State(state): State<AppState<S, A, R>>) -> Result<ModeResponse, ApiError>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    let current = state.controller.state().await?;
    Ok(ModeResponse::Ok(Json(ModeView::from(&current))))
}

/// `POST /api/mode`
///
/// Entering auto mode resets the bank and evaluates the latest reading
/// before responding.
pub async fn switch<S, A, R>(
    State(state): State<AppState<S, A, R>>,
    payload: Result<Json<SwitchModeRequest>, JsonRejection>,
) -> Result<ModeResponse, ApiError>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let updated = state
        .policy
        .switch_mode(Mode::from_auto_flag(req.is_auto_mode))
        .await?;
    Ok(ModeResponse::Ok(Json(ModeView::from(&updated))))
}
