//! Aerators and the shared system state that controls them.
//!
//! There are exactly [`AERATOR_COUNT`] aerators, created once at first boot
//! and never added or removed. The [`AeratorSystemState`] couples their
//! on/off statuses with the control [`Mode`]:
//!
//! | mode   | `auto_activated` | aerators            |
//! |--------|------------------|---------------------|
//! | manual | `false`          | independently set   |
//! | auto   | `false`          | all off             |
//! | auto   | `true`           | all on              |

use std::collections::BTreeSet;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{NotFoundError, TambakError};
use crate::id::{AERATOR_COUNT, AeratorId};
use crate::time::Timestamp;

/// Who decides the aerator statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The operator switches each aerator.
    #[default]
    Manual,
    /// The sensor policy switches all aerators together.
    Auto,
}

impl Mode {
    /// Map the wire-level `isAutoMode` flag onto a mode.
    #[must_use]
    pub fn from_auto_flag(is_auto: bool) -> Self {
        if is_auto { Self::Auto } else { Self::Manual }
    }

    #[must_use]
    pub fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => f.write_str("manual"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

/// Reading that caused the policy to force all aerators on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoReason {
    Temperature,
    Turbidity,
}

/// One on/off aerator. The display name is derived from the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Aerator {
    pub id: AeratorId,
    pub status: bool,
}

impl Aerator {
    #[must_use]
    pub fn new(id: AeratorId, status: bool) -> Self {
        Self { id, status }
    }

    /// Display label, e.g. `"Aerator 3"`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("Aerator {}", self.id)
    }
}

impl Serialize for Aerator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Aerator", 3)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("name", &self.name())?;
        s.serialize_field("status", &self.status)?;
        s.end()
    }
}

/// Complete, persisted state of the aerator bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AeratorSystemState {
    /// All aerators, ordered by id.
    pub aerators: Vec<Aerator>,
    pub mode: Mode,
    /// `true` iff the current all-on state was produced by the policy.
    pub auto_activated: bool,
    /// Why the policy activated; empty unless `auto_activated`.
    pub auto_activation_reason: BTreeSet<AutoReason>,
    pub last_updated: Timestamp,
}

impl AeratorSystemState {
    /// First-boot state: manual mode, every aerator off.
    #[must_use]
    pub fn initial(at: Timestamp) -> Self {
        Self {
            aerators: AeratorId::all().map(|id| Aerator::new(id, false)).collect(),
            mode: Mode::Manual,
            auto_activated: false,
            auto_activation_reason: BTreeSet::new(),
            last_updated: at,
        }
    }

    /// Set one aerator's status.
    ///
    /// # Errors
    ///
    /// Returns [`TambakError::NotFound`] when the id is absent.
    pub fn set_status(&mut self, id: AeratorId, status: bool) -> Result<(), TambakError> {
        let aerator = self
            .aerators
            .iter_mut()
            .find(|aerator| aerator.id == id)
            .ok_or_else(|| aerator_not_found(id))?;
        aerator.status = status;
        Ok(())
    }

    /// Set every aerator to the same status.
    pub fn set_all(&mut self, status: bool) {
        for aerator in &mut self.aerators {
            aerator.status = status;
        }
    }

    /// Number of running aerators.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.aerators.iter().filter(|aerator| aerator.status).count()
    }

    /// Enter auto mode: everything off, no activation.
    pub fn reset_for_auto(&mut self) {
        self.mode = Mode::Auto;
        self.set_all(false);
        self.clear_activation();
    }

    /// Policy forced all aerators on for `reasons`.
    pub fn activate(&mut self, reasons: BTreeSet<AutoReason>) {
        self.set_all(true);
        self.auto_activated = true;
        self.auto_activation_reason = reasons;
    }

    /// Policy released the aerators.
    pub fn deactivate(&mut self) {
        self.set_all(false);
        self.clear_activation();
    }

    fn clear_activation(&mut self) {
        self.auto_activated = false;
        self.auto_activation_reason.clear();
    }

    /// Whether two states describe the same devices and flags, ignoring
    /// `last_updated`.
    #[must_use]
    pub fn same_outcome(&self, other: &Self) -> bool {
        self.aerators == other.aerators
            && self.mode == other.mode
            && self.auto_activated == other.auto_activated
            && self.auto_activation_reason == other.auto_activation_reason
    }

    /// Check the fixed-count and mode invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let complete = self.aerators.len() == usize::from(AERATOR_COUNT)
            && self
                .aerators
                .iter()
                .zip(AeratorId::all())
                .all(|(aerator, id)| aerator.id == id);
        let mode_ok = match (self.mode, self.auto_activated) {
            (Mode::Auto, true) => self.aerators.iter().all(|a| a.status),
            (Mode::Auto, false) => self.aerators.iter().all(|a| !a.status),
            (Mode::Manual, _) => true,
        };
        complete && mode_ok
    }

    /// Status line shown to viewers.
    #[must_use]
    pub fn status_label(&self) -> String {
        match self.mode {
            Mode::Auto if self.auto_activated => "Aerator Mode otomatis (Aerator On)".to_string(),
            Mode::Auto => "Aerator Mode otomatis (Aerator Off)".to_string(),
            Mode::Manual => match self.active_count() {
                0 => "Aerator Off".to_string(),
                n => format!("Aerator On {n}/{AERATOR_COUNT}"),
            },
        }
    }
}

fn aerator_not_found(id: AeratorId) -> TambakError {
    NotFoundError {
        entity: "Aerator",
        id: id.to_string(),
    }
    .into()
}
