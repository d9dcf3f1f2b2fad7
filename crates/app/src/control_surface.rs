//! Client-side half of the command protocol.
//!
//! A [`ControlSurface`] renders state optimistically. Each command is a
//! two-phase local transaction:
//!
//! 1. [`ControlSurface::begin`] applies the command to the local view and
//!    remembers the view as it was.
//! 2. [`ControlSurface::settle`] adopts the authoritative state on success,
//!    or rolls back to the remembered view on failure.
//!
//! States pushed by the broadcast hub are folded in with
//! [`ControlSurface::reconcile`].

use std::future::Future;

use tambak_domain::aerator::AeratorSystemState;
use tambak_domain::command::AeratorCommand;
use tambak_domain::error::TambakError;

use crate::ports::{AeratorActuator, AeratorStateStore, StatePublisher};
use crate::services::aerator_controller::AeratorController;

/// Where a control surface sends its commands.
pub trait CommandGateway {
    /// Execute `command` and return the authoritative state.
    fn execute(
        &self,
        command: AeratorCommand,
    ) -> impl Future<Output = Result<AeratorSystemState, TambakError>> + Send;
}

impl<S, A, P> CommandGateway for AeratorController<S, A, P>
where
    S: AeratorStateStore + Send + Sync,
    A: AeratorActuator + Send + Sync,
    P: StatePublisher + Send + Sync,
{
    fn execute(
        &self,
        command: AeratorCommand,
    ) -> impl Future<Output = Result<AeratorSystemState, TambakError>> + Send {
        AeratorController::execute(self, command)
    }
}

impl<T: CommandGateway + Send + Sync> CommandGateway for std::sync::Arc<T> {
    fn execute(
        &self,
        command: AeratorCommand,
    ) -> impl Future<Output = Result<AeratorSystemState, TambakError>> + Send {
        (**self).execute(command)
    }
}

/// An in-flight command. Returned by [`ControlSurface::begin`].
#[derive(Debug)]
#[must_use = "an optimistic update must be settled"]
pub struct PendingCommand {
    command: AeratorCommand,
}

impl PendingCommand {
    #[must_use]
    pub fn command(&self) -> AeratorCommand {
        self.command
    }
}

/// Optimistic local view of the aerator bank.
pub struct ControlSurface<G> {
    gateway: G,
    view: AeratorSystemState,
    /// Authoritative state to fall back to while a command is in flight.
    rollback: Option<AeratorSystemState>,
    last_error: Option<String>,
}

impl<G: CommandGateway> ControlSurface<G> {
    pub fn new(gateway: G, initial: AeratorSystemState) -> Self {
        Self {
            gateway,
            view: initial,
            rollback: None,
            last_error: None,
        }
    }

    /// What the surface currently renders.
    #[must_use]
    pub fn view(&self) -> &AeratorSystemState {
        &self.view
    }

    /// Message of the most recent failed command, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.rollback.is_some()
    }

    /// Apply `command` to the local view.
    ///
    /// # Errors
    ///
    /// Returns the same rejection the server would give (e.g.
    /// [`TambakError::ModeConflict`]) without touching the view.
    pub fn begin(&mut self, command: AeratorCommand) -> Result<PendingCommand, TambakError> {
        let mut optimistic = self.view.clone();
        command.apply(&mut optimistic)?;
        let previous = std::mem::replace(&mut self.view, optimistic);
        self.rollback.get_or_insert(previous);
        Ok(PendingCommand { command })
    }

    /// Finish a command with the gateway's answer.
    ///
    /// On success the view takes the reply, unless a state pushed while the
    /// command was pending is newer than it.
    ///
    /// # Errors
    ///
    /// Hands back the gateway error after rolling the view back.
    pub fn settle(
        &mut self,
        pending: PendingCommand,
        result: Result<AeratorSystemState, TambakError>,
    ) -> Result<&AeratorSystemState, TambakError> {
        let rollback = self.rollback.take();
        match result {
            Ok(authoritative) => {
                self.view = match rollback {
                    Some(pushed) if pushed.last_updated > authoritative.last_updated => pushed,
                    _ => authoritative,
                };
                self.last_error = None;
                Ok(&self.view)
            }
            Err(err) => {
                tracing::warn!(command = ?pending.command, error = %err, "command failed, reverting");
                if let Some(previous) = rollback {
                    self.view = previous;
                }
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Run `command` end to end: optimistic apply, send, settle.
    ///
    /// # Errors
    ///
    /// Returns local rejections and gateway failures. The view is reverted
    /// in both cases.
    pub async fn execute(
        &mut self,
        command: AeratorCommand,
    ) -> Result<&AeratorSystemState, TambakError> {
        let pending = match self.begin(command) {
            Ok(pending) => pending,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };
        let result = self.gateway.execute(command).await;
        self.settle(pending, result)
    }

    /// Fold in a state pushed by the server.
    ///
    /// States older than what the surface already knows are ignored. While
    /// a command is in flight the pushed state only replaces the rollback
    /// target, so the optimistic view stays visible until settled.
    ///
    /// Returns whether the state was accepted.
    pub fn reconcile(&mut self, pushed: AeratorSystemState) -> bool {
        match &mut self.rollback {
            Some(rollback) => {
                if pushed.last_updated < rollback.last_updated {
                    return false;
                }
                *rollback = pushed;
            }
            None => {
                if pushed.last_updated < self.view.last_updated {
                    return false;
                }
                self.view = pushed;
            }
        }
        true
    }
}
