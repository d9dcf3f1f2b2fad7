//! Typed identifiers.
//!
//! Aerators are addressed by a small fixed integer (1..=8); sensor readings
//! carry UUID-backed ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TambakError, ValidationError};

/// Number of aerators installed in the pond. Fixed for the deployment.
pub const AERATOR_COUNT: u8 = 8;

/// Identifier of one aerator, guaranteed to lie in `1..=AERATOR_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct AeratorId(u8);

impl AeratorId {
    /// Validate a raw id.
    ///
    /// # Errors
    ///
    /// Returns [`TambakError::OutOfRange`] when `raw` is not in `1..=8`.
    pub fn new(raw: i64) -> Result<Self, TambakError> {
        match u8::try_from(raw) {
            Ok(id) if (1..=AERATOR_COUNT).contains(&id) => Ok(Self(id)),
            _ => Err(TambakError::OutOfRange(raw)),
        }
    }

    /// Every valid id, in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=AERATOR_COUNT).map(Self)
    }

    /// The raw numeric value.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position of this aerator in an id-ordered list.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<i64> for AeratorId {
    type Error = TambakError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<AeratorId> for u8 {
    fn from(id: AeratorId) -> Self {
        id.0
    }
}

impl fmt::Display for AeratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AeratorId {
    type Err = TambakError;

    /// Non-numeric input is [`TambakError::InvalidInput`]; numbers outside
    /// the installed range are [`TambakError::OutOfRange`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidAeratorId(s.to_owned()))?;
        Self::new(raw)
    }
}

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`SensorReading`](crate::sensor::SensorReading).
    SensorReadingId
);
