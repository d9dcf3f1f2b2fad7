//! Auto-activation policy.
//!
//! In auto mode a BAD temperature or turbidity forces every aerator on; once
//! both readings leave BAD the aerators are released. WARNING never triggers
//! anything, and a missing reading counts as no alarm.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::aerator::{AeratorSystemState, AutoReason};
use crate::sensor::{ReadingStatus, SensorSnapshot, classify_temperature, classify_turbidity};

/// Classified view of a [`SensorSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub temperature: Option<ReadingStatus>,
    pub turbidity: Option<ReadingStatus>,
}

impl Assessment {
    #[must_use]
    pub fn of(snapshot: &SensorSnapshot) -> Self {
        Self {
            temperature: classify_temperature(snapshot.temperature),
            turbidity: classify_turbidity(snapshot.turbidity),
        }
    }

    /// Metrics currently in BAD.
    #[must_use]
    pub fn reasons(&self) -> BTreeSet<AutoReason> {
        let mut reasons = BTreeSet::new();
        if self.temperature.is_some_and(ReadingStatus::is_bad) {
            reasons.insert(AutoReason::Temperature);
        }
        if self.turbidity.is_some_and(ReadingStatus::is_bad) {
            reasons.insert(AutoReason::Turbidity);
        }
        reasons
    }

    #[must_use]
    pub fn is_alarm(&self) -> bool {
        !self.reasons().is_empty()
    }

    /// Memo key for an evaluation against a state with the given activation.
    #[must_use]
    pub fn key(&self, auto_activated: bool) -> PolicyKey {
        PolicyKey {
            temperature: self.temperature,
            turbidity: self.turbidity,
            auto_activated,
        }
    }
}

/// What the last evaluation saw. Two evaluations with equal keys produce the
/// same outcome, so the second one can be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolicyKey {
    pub temperature: Option<ReadingStatus>,
    pub turbidity: Option<ReadingStatus>,
    pub auto_activated: bool,
}

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "reasons", rename_all = "lowercase")]
pub enum PolicyDecision {
    /// Force all aerators on for these reasons.
    Activate(BTreeSet<AutoReason>),
    /// Release the aerators.
    Deactivate,
    /// Nothing to change.
    Hold,
}

/// Decide what the policy wants for `state` given `assessment`.
///
/// Only meaningful in auto mode; callers check the mode first.
#[must_use]
pub fn decide(state: &AeratorSystemState, assessment: &Assessment) -> PolicyDecision {
    let reasons = assessment.reasons();
    if !reasons.is_empty() {
        let already = state.auto_activated
            && state.auto_activation_reason == reasons
            && state.aerators.iter().all(|a| a.status);
        if already {
            PolicyDecision::Hold
        } else {
            PolicyDecision::Activate(reasons)
        }
    } else if state.auto_activated {
        PolicyDecision::Deactivate
    } else {
        PolicyDecision::Hold
    }
}

impl PolicyDecision {
    /// Apply the decision to `state`. Returns `false` for [`PolicyDecision::Hold`].
    pub fn apply(&self, state: &mut AeratorSystemState) -> bool {
        match self {
            Self::Activate(reasons) => {
                state.activate(reasons.clone());
                true
            }
            Self::Deactivate => {
                state.deactivate();
                true
            }
            Self::Hold => false,
        }
    }
}
