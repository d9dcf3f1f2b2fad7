//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use tambak_domain::error::{TambakError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// Maps [`TambakError`] to an HTTP response with appropriate status code.
pub struct ApiError(TambakError);

impl From<TambakError> for ApiError {
    fn from(err: TambakError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::MalformedPayload(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ValidationError::MalformedPayload(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TambakError::InvalidInput(_) | TambakError::OutOfRange(_) => StatusCode::BAD_REQUEST,
            TambakError::NotFound(_) => StatusCode::NOT_FOUND,
            TambakError::ModeConflict { .. } => StatusCode::CONFLICT,
            TambakError::Persistence(err) => {
                tracing::error!(error = %err, "persistence failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            TambakError::Actuator(err) => {
                tracing::error!(error = %err, "actuator failure");
                StatusCode::BAD_GATEWAY
            }
        };

        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}
