//! Shared application state for axum handlers.

use std::sync::Arc;

use tambak_app::broadcast_hub::BroadcastHub;
use tambak_app::ports::{AeratorActuator, AeratorStateStore, SensorReadingSink, SensorReadingSource};
use tambak_app::services::aerator_controller::AeratorController;
use tambak_app::services::auto_policy::AutoPolicyRunner;
use tambak_app::services::sensor_service::SensorService;

/// Controller type served over HTTP; it always publishes to the hub.
pub type Controller<S, A> = AeratorController<S, A, Arc<BroadcastHub>>;

/// Policy runner type served over HTTP.
pub type PolicyRunner<S, A, R> = AutoPolicyRunner<S, A, Arc<BroadcastHub>, R>;

/// Application state shared across all axum handlers.
///
/// Generic over the state store `S`, actuator `A` and sensor repository `R`
/// to avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone`; only the `Arc`
/// wrappers are cloned.
pub struct AppState<S, A, R> {
    /// Aerator state machine.
    pub controller: Arc<Controller<S, A>>,
    /// Mode switching with the immediate first evaluation.
    pub policy: Arc<PolicyRunner<S, A, R>>,
    /// Sensor reading queries and ingestion.
    pub sensors: Arc<SensorService<R>>,
    /// Fan-out for the event stream.
    pub hub: Arc<BroadcastHub>,
}

impl<S, A, R> Clone for AppState<S, A, R> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            policy: Arc::clone(&self.policy),
            sensors: Arc::clone(&self.sensors),
            hub: Arc::clone(&self.hub),
        }
    }
}

impl<S, A, R> AppState<S, A, R>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// The same controller and runner are usually shared with the
    /// background policy loop.
    pub fn from_arcs(
        controller: Arc<Controller<S, A>>,
        policy: Arc<PolicyRunner<S, A, R>>,
        sensors: Arc<SensorService<R>>,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        Self {
            controller,
            policy,
            sensors,
            hub,
        }
    }
}
