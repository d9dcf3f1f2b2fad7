//! Operator commands and the state transitions they cause.
//!
//! The same [`AeratorCommand::apply`] runs on the server (authoritative) and
//! on a control surface (optimistic), so both sides agree on what a command
//! does to an [`AeratorSystemState`].

use serde::{Deserialize, Serialize};

use crate::aerator::{AeratorSystemState, Mode};
use crate::error::TambakError;
use crate::id::AeratorId;

/// A command issued by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum AeratorCommand {
    /// Switch one aerator. Manual mode only.
    Toggle { id: AeratorId, status: bool },
    /// Switch every aerator. Manual mode only.
    ToggleAll { status: bool },
    /// Change who controls the aerators.
    SetMode { mode: Mode },
}

/// Whether applying a command produced a state that must be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
}

impl AeratorCommand {
    /// Apply the command to `state` in place.
    ///
    /// Toggles always report [`Transition::Changed`], even when the aerator
    /// already had the requested status. Setting the current mode is
    /// [`Transition::Unchanged`].
    ///
    /// # Errors
    ///
    /// - [`TambakError::ModeConflict`] for a toggle while in auto mode.
    /// - [`TambakError::NotFound`] when the target aerator is missing.
    ///
    /// `state` is left untouched on error.
    pub fn apply(&self, state: &mut AeratorSystemState) -> Result<Transition, TambakError> {
        match *self {
            Self::Toggle { id, status } => {
                ensure_manual(state)?;
                state.set_status(id, status)?;
                Ok(Transition::Changed)
            }
            Self::ToggleAll { status } => {
                ensure_manual(state)?;
                state.set_all(status);
                Ok(Transition::Changed)
            }
            Self::SetMode { mode } if mode == state.mode => Ok(Transition::Unchanged),
            Self::SetMode { mode: Mode::Auto } => {
                state.reset_for_auto();
                Ok(Transition::Changed)
            }
            Self::SetMode { mode: Mode::Manual } => {
                state.mode = Mode::Manual;
                state.auto_activated = false;
                state.auto_activation_reason.clear();
                Ok(Transition::Changed)
            }
        }
    }

    /// Whether this command changes the mode.
    #[must_use]
    pub fn is_mode_change(&self) -> bool {
        matches!(self, Self::SetMode { .. })
    }
}

fn ensure_manual(state: &AeratorSystemState) -> Result<(), TambakError> {
    if state.mode.is_auto() {
        return Err(TambakError::ModeConflict { mode: state.mode });
    }
    Ok(())
}
