//! JSON REST handlers for water-quality readings.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use tambak_app::ports::{AeratorActuator, AeratorStateStore, SensorReadingSink, SensorReadingSource};
use tambak_app::services::sensor_service::{HistoryQuery, NewReading};
use tambak_domain::error::ValidationError;
use tambak_domain::sensor::{ReadingClassification, SensorReading};
use tambak_domain::time::{Timestamp, parse_rfc3339};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the history endpoint.
#[derive(Deserialize)]
pub struct HistoryParams {
    /// Start of time range (RFC 3339). Defaults to 24 hours before `to`.
    pub from: Option<String>,
    /// End of time range (RFC 3339). Defaults to now.
    pub to: Option<String>,
    /// Maximum number of readings. Defaults to 30, capped at 1000.
    pub limit: Option<usize>,
}

/// Request body for ingesting a probe reading.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    pub temperature: Option<f64>,
    pub turbidity: Option<f64>,
    pub ph: Option<f64>,
    pub quality_index: Option<f64>,
    /// RFC 3339. Defaults to the time of ingestion.
    pub recorded_at: Option<String>,
}

/// A reading together with its per-metric verdicts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingView {
    #[serde(flatten)]
    pub reading: SensorReading,
    pub classification: ReadingClassification,
}

impl From<SensorReading> for ReadingView {
    fn from(reading: SensorReading) -> Self {
        Self {
            classification: reading.classification(),
            reading,
        }
    }
}

/// Possible responses from the latest endpoint.
pub enum LatestResponse {
    Ok(Json<ReadingView>),
}

impl IntoResponse for LatestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the history endpoint.
pub enum HistoryResponse {
    /// 200 OK with readings, newest first.
    Ok(Json<Vec<SensorReading>>),
}

impl IntoResponse for HistoryResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the ingest endpoint.
pub enum IngestResponse {
    Created(Json<ReadingView>),
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

fn parse_timestamp(value: &str) -> Result<Timestamp, ApiError> {
    parse_rfc3339(value)
        .map_err(|_| ApiError::from(ValidationError::InvalidTimestamp(value.to_owned())))
}

fn parse_optional(value: Option<&str>) -> Result<Option<Timestamp>, ApiError> {
    value.map(parse_timestamp).transpose()
}

/// `GET /api/sensors/latest`
pub async fn latest<S, A, R>(
    State(state): State<AppState<S, A, R>>,
) -> Result<LatestResponse, ApiError>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    let reading = state.sensors.latest().await?;
    Ok(LatestResponse::Ok(Json(reading.into())))
}

/// `GET /api/sensors/history?from=&to=&limit=`
pub async fn history<S, A, R>(
    State(state): State<AppState<S, A, R>>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<HistoryResponse, ApiError>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    let Query(params) = params?;
    let query = HistoryQuery {
        from: parse_optional(params.from.as_deref())?,
        to: parse_optional(params.to.as_deref())?,
        limit: params.limit,
    };
    let readings = state.sensors.history(query).await?;
    Ok(HistoryResponse::Ok(Json(readings)))
}

/// `POST /api/sensors`
pub async fn ingest<S, A, R>(
    State(state): State<AppState<S, A, R>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<IngestResponse, ApiError>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let reading = NewReading {
        temperature: req.temperature,
        turbidity: req.turbidity,
        ph: req.ph,
        quality_index: req.quality_index,
        recorded_at: parse_optional(req.recorded_at.as_deref())?,
    };
    let stored = state.sensors.record(reading).await?;
    Ok(IngestResponse::Created(Json(stored.into())))
}
