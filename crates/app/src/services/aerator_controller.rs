//! The single owner of aerator state mutations.
//!
//! Every mutation is a read-modify-write cycle under one async mutex:
//! read the stored state, apply a transition, drive the actuator, persist,
//! then publish. Holding the mutex until the publish completes keeps
//! broadcasts in write order. Reads go straight to the store and never wait
//! on the mutex.

use tokio::sync::Mutex;

use tambak_domain::aerator::{AeratorSystemState, Mode};
use tambak_domain::command::{AeratorCommand, Transition};
use tambak_domain::error::TambakError;
use tambak_domain::id::AeratorId;
use tambak_domain::policy::{self, Assessment, PolicyDecision, PolicyKey};
use tambak_domain::sensor::SensorSnapshot;
use tambak_domain::time::now;

use crate::ports::{AeratorActuator, AeratorStateStore, StatePublisher};

/// What one call to [`AeratorController::evaluate_auto_policy`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoEvaluation {
    /// Mode is manual; the policy does not run.
    Inactive,
    /// Classification matches the previous evaluation; skipped.
    Memoized,
    /// Evaluated with nothing to change.
    Held,
    /// The decision was committed.
    Applied(PolicyDecision),
}

/// Result of a policy evaluation together with the state it left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub evaluation: AutoEvaluation,
    pub state: AeratorSystemState,
}

/// Serializes every change to the aerator bank.
///
/// Generic over the store `S`, actuator `A` and publisher `P` so that
/// adapters are injected at the composition root.
pub struct AeratorController<S, A, P> {
    store: S,
    actuator: A,
    publisher: P,
    /// Write lock; guards the memo of the last policy evaluation.
    memo: Mutex<Option<PolicyKey>>,
}

impl<S, A, P> AeratorController<S, A, P>
where
    S: AeratorStateStore + Send + Sync,
    A: AeratorActuator + Send + Sync,
    P: StatePublisher + Send + Sync,
{
    pub fn new(store: S, actuator: A, publisher: P) -> Self {
        Self {
            store,
            actuator,
            publisher,
            memo: Mutex::new(None),
        }
    }

    /// Current state as persisted.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn state(&self) -> Result<AeratorSystemState, TambakError> {
        self.store.read().await
    }

    /// Switch between manual and auto mode.
    ///
    /// Entering auto turns every aerator off. Setting the current mode is a
    /// no-op returning the current state.
    ///
    /// # Errors
    ///
    /// Returns actuator or persistence failures; nothing is broadcast then.
    #[tracing::instrument(skip(self))]
    pub async fn set_mode(&self, mode: Mode) -> Result<AeratorSystemState, TambakError> {
        self.execute(AeratorCommand::SetMode { mode }).await
    }

    /// Set one aerator's status.
    ///
    /// # Errors
    ///
    /// - [`TambakError::ModeConflict`] in auto mode.
    /// - [`TambakError::NotFound`] when the stored record lacks `id`.
    /// - Actuator or persistence failures.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_one(
        &self,
        id: AeratorId,
        status: bool,
    ) -> Result<AeratorSystemState, TambakError> {
        self.execute(AeratorCommand::Toggle { id, status }).await
    }

    /// Set every aerator's status.
    ///
    /// # Errors
    ///
    /// - [`TambakError::ModeConflict`] in auto mode.
    /// - Actuator or persistence failures.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_all(&self, status: bool) -> Result<AeratorSystemState, TambakError> {
        self.execute(AeratorCommand::ToggleAll { status }).await
    }

    /// Run one operator command through the state machine.
    ///
    /// # Errors
    ///
    /// See [`AeratorCommand::apply`] plus actuator and persistence failures.
    pub async fn execute(
        &self,
        command: AeratorCommand,
    ) -> Result<AeratorSystemState, TambakError> {
        let mut memo = self.memo.lock().await;
        let current = self.store.read().await?;
        let mut next = current.clone();

        match command.apply(&mut next) {
            Ok(Transition::Unchanged) => {
                tracing::debug!(?command, "command left state unchanged");
                return Ok(current);
            }
            Ok(Transition::Changed) => {}
            Err(err @ TambakError::NotFound(_)) => {
                tracing::error!(error = %err, "aerator missing from stored state");
                return Err(err);
            }
            Err(err @ TambakError::ModeConflict { .. }) => {
                tracing::warn!(?command, "manual command rejected in auto mode");
                return Err(err);
            }
            Err(err) => return Err(err),
        }

        let committed = self.commit(next).await?;
        if command.is_mode_change() {
            *memo = None;
            tracing::info!(mode = %committed.mode, "aerator mode changed");
        }
        Ok(committed)
    }

    /// Evaluate the auto policy against `snapshot`.
    ///
    /// Does nothing in manual mode, or when the snapshot classifies the same
    /// as last time against the same activation.
    ///
    /// # Errors
    ///
    /// Returns actuator or persistence failures. The memo is left untouched,
    /// so the next evaluation retries.
    #[tracing::instrument(skip(self, snapshot), fields(
        temperature = ?snapshot.temperature,
        turbidity = ?snapshot.turbidity,
    ))]
    pub async fn evaluate_auto_policy(
        &self,
        snapshot: &SensorSnapshot,
    ) -> Result<PolicyOutcome, TambakError> {
        let mut memo = self.memo.lock().await;
        let current = self.store.read().await?;
        if current.mode != Mode::Auto {
            return Ok(PolicyOutcome {
                evaluation: AutoEvaluation::Inactive,
                state: current,
            });
        }

        let assessment = Assessment::of(snapshot);
        let key = assessment.key(current.auto_activated);
        if *memo == Some(key) {
            return Ok(PolicyOutcome {
                evaluation: AutoEvaluation::Memoized,
                state: current,
            });
        }

        let decision = policy::decide(&current, &assessment);
        let mut next = current.clone();
        if !decision.apply(&mut next) {
            *memo = Some(key);
            return Ok(PolicyOutcome {
                evaluation: AutoEvaluation::Held,
                state: current,
            });
        }

        let committed = self.commit(next).await?;
        *memo = Some(assessment.key(committed.auto_activated));
        tracing::info!(
            ?decision,
            active = committed.active_count(),
            "auto policy switched aerators"
        );
        Ok(PolicyOutcome {
            evaluation: AutoEvaluation::Applied(decision),
            state: committed,
        })
    }

    /// Actuate, persist, then publish. Callers hold the write lock.
    ///
    /// `next` still carries the previous `last_updated`; the new stamp never
    /// goes backwards even if the wall clock does.
    async fn commit(
        &self,
        mut next: AeratorSystemState,
    ) -> Result<AeratorSystemState, TambakError> {
        next.last_updated = now().max(next.last_updated);
        self.actuator.apply(&next.aerators).await?;
        let stored = self.store.write(next).await?;
        if let Err(err) = self.publisher.publish(stored.clone()).await {
            tracing::warn!(error = %err, "failed to broadcast committed state");
        }
        Ok(stored)
    }
}
