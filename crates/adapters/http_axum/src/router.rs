//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use tambak_app::ports::{AeratorActuator, AeratorStateStore, SensorReadingSink, SensorReadingSource};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves API routes under `/api` and a plain-text `/health` probe.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<S, A, R>(state: AppState<S, A, R>) -> Router
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get, test_app};
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = test_app().router();

        let response = get(&app, "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_route() {
        let app = test_app().router();
        let response = get(&app, "/api/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
