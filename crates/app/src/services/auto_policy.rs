//! Periodic auto-policy evaluation.
//!
//! On every tick the runner fetches the latest sensor reading and hands it to
//! the controller. Failures are logged and retried on the next tick; no
//! backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use tambak_domain::aerator::{AeratorSystemState, Mode};
use tambak_domain::error::TambakError;

use crate::ports::{AeratorActuator, AeratorStateStore, SensorReadingSource, StatePublisher};
use crate::services::aerator_controller::{AeratorController, PolicyOutcome};

/// Feeds sensor readings into [`AeratorController::evaluate_auto_policy`].
pub struct AutoPolicyRunner<S, A, P, R> {
    controller: Arc<AeratorController<S, A, P>>,
    readings: R,
}

impl<S, A, P, R> AutoPolicyRunner<S, A, P, R>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    P: StatePublisher + Send + Sync + 'static,
    R: SensorReadingSource + Send + Sync + 'static,
{
    pub fn new(controller: Arc<AeratorController<S, A, P>>, readings: R) -> Self {
        Self {
            controller,
            readings,
        }
    }

    /// Evaluate once against the latest reading.
    ///
    /// Returns `None` when no reading has been recorded yet.
    ///
    /// # Errors
    ///
    /// Propagates sensor source, actuator and persistence failures.
    pub async fn tick(&self) -> Result<Option<PolicyOutcome>, TambakError> {
        let Some(reading) = self.readings.latest().await? else {
            tracing::debug!("no sensor reading yet, skipping auto policy");
            return Ok(None);
        };
        let outcome = self
            .controller
            .evaluate_auto_policy(&reading.snapshot())
            .await?;
        Ok(Some(outcome))
    }

    /// Switch mode, then evaluate immediately when entering auto.
    ///
    /// The reset to all-off is committed before the evaluation starts. A
    /// failed evaluation does not undo the mode switch; it is logged and
    /// the periodic loop retries.
    ///
    /// # Errors
    ///
    /// Returns failures of the mode switch itself.
    #[tracing::instrument(skip(self))]
    pub async fn switch_mode(&self, mode: Mode) -> Result<AeratorSystemState, TambakError> {
        let state = self.controller.set_mode(mode).await?;
        if mode != Mode::Auto {
            return Ok(state);
        }
        match self.tick().await {
            Ok(Some(outcome)) => Ok(outcome.state),
            Ok(None) => Ok(state),
            Err(err) => {
                tracing::warn!(error = %err, "initial auto policy evaluation failed");
                Ok(state)
            }
        }
    }

    /// Spawn the evaluation loop on the current runtime.
    ///
    /// The task runs until aborted.
    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(period_ms = period.as_millis(), "auto policy loop started");
            loop {
                ticker.tick().await;
                if let Err(err) = self.tick().await {
                    tracing::warn!(error = %err, "auto policy evaluation failed, retrying next tick");
                }
            }
        })
    }
}
