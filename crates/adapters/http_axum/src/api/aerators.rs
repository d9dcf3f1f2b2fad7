//! JSON REST handlers for manual aerator control.

use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use tambak_app::ports::{AeratorActuator, AeratorStateStore, SensorReadingSink, SensorReadingSource};
use tambak_domain::id::AeratorId;

use super::StateView;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for both toggle endpoints.
#[derive(Deserialize)]
pub struct ToggleRequest {
    pub status: bool,
}

/// Possible responses from the aerator endpoints.
pub enum StateResponse {
    Ok(Json<StateView>),
}

impl IntoResponse for StateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/aerators`
pub async fn list<S, A, R>(
    State(state): State<AppState<S, A, R>>,
) -> Result<StateResponse, ApiError>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    let current = state.controller.state().await?;
    Ok(StateResponse::Ok(Json(current.into())))
}

/// `POST /api/aerators/{id}/toggle`
pub async fn toggle<S, A, R>(
    State(state): State<AppState<S, A, R>>,
    Path(id): Path<String>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<StateResponse, ApiError>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    let id = AeratorId::from_str(&id)?;
    let Json(req) = payload?;
    let updated = state.controller.toggle_one(id, req.status).await?;
    Ok(StateResponse::Ok(Json(updated.into())))
}

/// `POST /api/aerators/toggle-all`
pub async fn toggle_all<S, A, R>(
    State(state): State<AppState<S, A, R>>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<StateResponse, ApiError>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let updated = state.controller.toggle_all(req.status).await?;
    Ok(StateResponse::Ok(Json(updated.into())))
}
