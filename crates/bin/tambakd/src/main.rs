//! # tambakd — tambak aerator control daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`tambak.toml`, env vars)
//! - Initialise `tracing` output
//! - Initialize the `SQLite` connection pool and run migrations
//! - Seed the broadcast hub with the persisted aerator state
//! - Construct the controller, policy runner and sensor service
//! - Spawn the periodic auto-policy loop
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use tambak_adapter_http_axum::state::AppState;
use tambak_adapter_storage_sqlite_sqlx::aerator_store::SqliteAeratorStateStore;
use tambak_adapter_storage_sqlite_sqlx::pool;
use tambak_adapter_storage_sqlite_sqlx::sensor_repo::SqliteSensorReadingRepository;
use tambak_adapter_virtual::VirtualAeratorBank;
use tambak_app::broadcast_hub::BroadcastHub;
use tambak_app::ports::AeratorStateStore;
use tambak_app::services::aerator_controller::AeratorController;
use tambak_app::services::auto_policy::AutoPolicyRunner;
use tambak_app::services::sensor_service::SensorService;
use tambak_domain::aerator::AeratorSystemState;
use tambak_domain::error::TambakError;
use tambak_domain::time::now;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    // Database
    let db = pool::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("failed to open database")?;
    let pool = db.pool().clone();

    // Adapters
    let store = Arc::new(SqliteAeratorStateStore::new(pool.clone()));
    let readings = Arc::new(SqliteSensorReadingRepository::new(pool));
    let bank = VirtualAeratorBank::new(config.actuator_latency());

    let initial = load_initial_state(&store).await?;
    tracing::info!(
        mode = %initial.mode,
        active = initial.active_count(),
        "aerator state loaded"
    );
    let hub = Arc::new(BroadcastHub::new(config.broadcast.capacity, initial));

    // Services
    let controller = Arc::new(AeratorController::new(
        Arc::clone(&store),
        bank,
        Arc::clone(&hub),
    ));
    let policy = Arc::new(AutoPolicyRunner::new(
        Arc::clone(&controller),
        Arc::clone(&readings),
    ));
    let sensors = Arc::new(SensorService::new(readings));

    let policy_task = if config.policy.enabled {
        Some(Arc::clone(&policy).spawn(config.policy_interval()))
    } else {
        tracing::info!("periodic auto policy disabled");
        None
    };

    // HTTP
    let state = AppState::from_arcs(controller, policy, sensors, hub);
    let app = tambak_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("tambakd listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = policy_task {
        task.abort();
    }
    tracing::info!("tambakd stopped");
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Read the persisted state, recreating the system record when it is gone.
async fn load_initial_state(
    store: &SqliteAeratorStateStore,
) -> anyhow::Result<AeratorSystemState> {
    match store.read().await {
        Ok(state) => Ok(state),
        Err(TambakError::NotFound(err)) => {
            tracing::warn!(%err, "no persisted aerator state, starting in manual mode");
            let state = store
                .write(AeratorSystemState::initial(now()))
                .await
                .context("failed to restore default aerator state")?;
            Ok(state)
        }
        Err(err) => Err(err).context("failed to read aerator state"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
