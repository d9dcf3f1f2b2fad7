//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`TambakError`]
//! via `#[from]` / `From` impls. Every variant is returned synchronously to
//! the caller; nothing in the core retries on its own.

use crate::aerator::Mode;
use crate::id::AERATOR_COUNT;

/// Boxed source error for failures that originate in adapters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for every operation exposed by the core.
#[derive(Debug, thiserror::Error)]
pub enum TambakError {
    /// Malformed command payload. Rejected before any state is touched.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Aerator id outside `1..=AERATOR_COUNT`.
    #[error("aerator id {0} is out of range (expected 1..={AERATOR_COUNT})")]
    OutOfRange(i64),

    /// Well-formed id missing from the store. Indicates a data-integrity fault.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Manual command attempted while the policy owns the aerators.
    #[error("manual control is disabled while mode is {mode}")]
    ModeConflict { mode: Mode },

    /// The store did not durably accept the write.
    #[error("failed to persist aerator state")]
    Persistence(#[source] BoxError),

    /// The actuator did not acknowledge the command.
    #[error("aerator hardware did not acknowledge the command")]
    Actuator(#[source] BoxError),
}

impl TambakError {
    /// Stable machine-readable discriminant, used in API error bodies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::OutOfRange(_) => "out_of_range",
            Self::NotFound(_) => "not_found",
            Self::ModeConflict { .. } => "mode_conflict",
            Self::Persistence(_) => "persistence_failure",
            Self::Actuator(_) => "actuator_failure",
        }
    }
}

/// Why a payload was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed request body: {0}")]
    MalformedPayload(String),

    #[error("aerator id {0:?} is not a number")]
    InvalidAeratorId(String),

    #[error("{field} must be a finite number")]
    NonFiniteReading { field: &'static str },

    #[error("pH {0} is outside 0..=14")]
    PhOutOfRange(f64),

    #[error("quality index {0} is outside 0..=100")]
    QualityIndexOutOfRange(f64),

    #[error("invalid timestamp {0:?}, expected RFC 3339")]
    InvalidTimestamp(String),

    #[error("range start is after range end")]
    InvertedRange,
}

/// A lookup did not find the requested record.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
