//! End-to-end smoke tests for the full tambakd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real
//! store, virtual aerator bank, broadcast hub, real axum router) and
//! exercises the HTTP layer via `tower::ServiceExt::oneshot` — no TCP port
//! is bound.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tambak_adapter_http_axum::router;
use tambak_adapter_http_axum::state::AppState;
use tambak_adapter_storage_sqlite_sqlx::aerator_store::SqliteAeratorStateStore;
use tambak_adapter_storage_sqlite_sqlx::pool::Config;
use tambak_adapter_storage_sqlite_sqlx::sensor_repo::SqliteSensorReadingRepository;
use tambak_adapter_virtual::VirtualAeratorBank;
use tambak_app::broadcast_hub::BroadcastHub;
use tambak_app::ports::AeratorStateStore;
use tambak_app::services::aerator_controller::AeratorController;
use tambak_app::services::auto_policy::AutoPolicyRunner;
use tambak_app::services::sensor_service::SensorService;
use tower::ServiceExt;

struct Stack {
    app: axum::Router,
    store: Arc<SqliteAeratorStateStore>,
    hub: Arc<BroadcastHub>,
}

/// Build a fully-wired router backed by an in-memory `SQLite` database.
async fn stack() -> Stack {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");
    let pool = db.pool().clone();

    let store = Arc::new(SqliteAeratorStateStore::new(pool.clone()));
    let readings = Arc::new(SqliteSensorReadingRepository::new(pool));
    let initial = store.read().await.expect("seeded state");
    let hub = Arc::new(BroadcastHub::new(16, initial));

    let controller = Arc::new(AeratorController::new(
        Arc::clone(&store),
        VirtualAeratorBank::default(),
        Arc::clone(&hub),
    ));
    let policy = Arc::new(AutoPolicyRunner::new(
        Arc::clone(&controller),
        Arc::clone(&readings),
    ));
    let sensors = Arc::new(SensorService::new(readings));
    let state = AppState::from_arcs(controller, policy, sensors, Arc::clone(&hub));

    Stack {
        app: router::build(state),
        store,
        hub,
    }
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let stack = stack().await;

    let resp = send(&stack.app, "GET", "/health", None).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Manual control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_start_with_eight_aerators_off() {
    let stack = stack().await;

    let resp = send(&stack.app, "GET", "/api/aerators", None).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let aerators = body["aerators"].as_array().unwrap();
    assert_eq!(aerators.len(), 8);
    assert!(aerators.iter().all(|a| a["status"] == false));
    assert_eq!(body["mode"], "manual");
}

#[tokio::test]
async fn should_persist_manual_toggle() {
    let stack = stack().await;

    let resp = send(
        &stack.app,
        "POST",
        "/api/aerators/3/toggle",
        Some(json!({"status": true})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = stack.store.read().await.unwrap();
    assert!(stored.aerators[2].status);
    assert_eq!(stored.active_count(), 1);
    assert!(stack.hub.latest().same_outcome(&stored));
}

#[tokio::test]
async fn should_reject_out_of_range_id_without_writing() {
    let stack = stack().await;
    let before = stack.store.read().await.unwrap();

    let resp = send(
        &stack.app,
        "POST",
        "/api/aerators/9/toggle",
        Some(json!({"status": true})),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stack.store.read().await.unwrap(), before);
}

// ---------------------------------------------------------------------------
// Auto mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_reset_then_activate_when_entering_auto_with_turbid_water() {
    let stack = stack().await;
    for id in [1, 2, 5] {
        send(
            &stack.app,
            "POST",
            &format!("/api/aerators/{id}/toggle"),
            Some(json!({"status": true})),
        )
        .await;
    }
    let created = send(
        &stack.app,
        "POST",
        "/api/sensors",
        Some(json!({"temperature": 28.0, "turbidity": 72.0})),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let mut viewer = stack.hub.subscribe();
    let _ = viewer.next().await;

    let resp = send(&stack.app, "POST", "/api/mode", Some(json!({"isAutoMode": true}))).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["autoActivated"], true);
    assert_eq!(body["autoActivationReason"], json!(["turbidity"]));

    let reset = viewer.next().await.unwrap();
    assert_eq!(reset.active_count(), 0);
    assert!(!reset.auto_activated);
    let activated = viewer.next().await.unwrap();
    assert_eq!(activated.active_count(), 8);
    assert!(activated.last_updated >= reset.last_updated);

    let stored = stack.store.read().await.unwrap();
    assert!(stored.same_outcome(&activated));
}

#[tokio::test]
async fn should_refuse_manual_toggle_in_auto_mode() {
    let stack = stack().await;
    send(&stack.app, "POST", "/api/mode", Some(json!({"isAutoMode": true}))).await;

    let resp = send(
        &stack.app,
        "POST",
        "/api/aerators/toggle-all",
        Some(json!({"status": true})),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(stack.store.read().await.unwrap().active_count(), 0);
}

#[tokio::test]
async fn should_report_mode_after_switch() {
    let stack = stack().await;
    send(&stack.app, "POST", "/api/mode", Some(json!({"isAutoMode": true}))).await;

    let resp = send(&stack.app, "GET", "/api/mode", None).await;

    let body = json_body(resp).await;
    assert_eq!(body["isAutoMode"], true);
    assert_eq!(body["status"], "Aerator Mode otomatis (Aerator Off)");
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_round_trip_sensor_reading() {
    let stack = stack().await;
    send(
        &stack.app,
        "POST",
        "/api/sensors",
        Some(json!({"temperature": 26.4, "turbidity": 18.0, "ph": 7.9, "qualityIndex": 84.0})),
    )
    .await;

    let latest = json_body(send(&stack.app, "GET", "/api/sensors/latest", None).await).await;
    assert_eq!(latest["turbidity"], 18.0);
    assert_eq!(latest["classification"]["turbidity"], "warning");
    assert_eq!(latest["classification"]["qualityIndex"], "good");

    let history = json_body(send(&stack.app, "GET", "/api/sensors/history", None).await).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}
