//! Sensor readings and their three-tier classification.
//!
//! Readings are produced outside the core (the probe ingestion path) and are
//! read-only here. A missing value means "no signal yet" and never raises an
//! alarm.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::SensorReadingId;
use crate::time::Timestamp;

/// Three-tier verdict for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Good,
    Warning,
    Bad,
}

impl ReadingStatus {
    #[must_use]
    pub fn is_bad(self) -> bool {
        matches!(self, Self::Bad)
    }
}

/// Water temperature in °C.
///
/// GOOD 25..=32, WARNING 20..25 or 32..=35 (upper bound inclusive), BAD otherwise.
#[must_use]
pub fn classify_temperature(celsius: Option<f64>) -> Option<ReadingStatus> {
    let t = celsius?;
    Some(if (25.0..=32.0).contains(&t) {
        ReadingStatus::Good
    } else if (20.0..25.0).contains(&t) || (t > 32.0 && t <= 35.0) {
        ReadingStatus::Warning
    } else {
        ReadingStatus::Bad
    })
}

/// Turbidity in NTU.
///
/// GOOD 20..=50, WARNING below 20 or 50..=60 (lower bound exclusive), BAD above 60.
#[must_use]
pub fn classify_turbidity(ntu: Option<f64>) -> Option<ReadingStatus> {
    let k = ntu?;
    Some(if (20.0..=50.0).contains(&k) {
        ReadingStatus::Good
    } else if k < 20.0 || (k > 50.0 && k <= 60.0) {
        ReadingStatus::Warning
    } else {
        ReadingStatus::Bad
    })
}

/// pH. Display only.
#[must_use]
pub fn classify_ph(ph: Option<f64>) -> Option<ReadingStatus> {
    let ph = ph?;
    Some(if (6.5..=8.0).contains(&ph) {
        ReadingStatus::Good
    } else if (6.0..=8.5).contains(&ph) {
        ReadingStatus::Warning
    } else {
        ReadingStatus::Bad
    })
}

/// Derived water-quality index (0–100). Display only.
#[must_use]
pub fn classify_quality_index(index: Option<f64>) -> Option<ReadingStatus> {
    let index = index?;
    Some(if index >= 80.0 {
        ReadingStatus::Good
    } else if index >= 60.0 {
        ReadingStatus::Warning
    } else {
        ReadingStatus::Bad
    })
}

/// A stored probe reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub id: SensorReadingId,
    pub temperature: Option<f64>,
    pub turbidity: Option<f64>,
    pub ph: Option<f64>,
    pub quality_index: Option<f64>,
    pub recorded_at: Timestamp,
}

impl SensorReading {
    /// The subset of the reading the auto policy looks at.
    #[must_use]
    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            temperature: self.temperature,
            turbidity: self.turbidity,
            observed_at: self.recorded_at,
        }
    }

    /// Per-metric verdicts for display.
    #[must_use]
    pub fn classification(&self) -> ReadingClassification {
        ReadingClassification {
            temperature: classify_temperature(self.temperature),
            turbidity: classify_turbidity(self.turbidity),
            ph: classify_ph(self.ph),
            quality_index: classify_quality_index(self.quality_index),
        }
    }

    /// Check that every present value is physically plausible.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("temperature", self.temperature),
            ("turbidity", self.turbidity),
            ("ph", self.ph),
            ("qualityIndex", self.quality_index),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(ValidationError::NonFiniteReading { field });
            }
        }
        if let Some(ph) = self.ph.filter(|ph| !(0.0..=14.0).contains(ph)) {
            return Err(ValidationError::PhOutOfRange(ph));
        }
        if let Some(index) = self.quality_index.filter(|i| !(0.0..=100.0).contains(i)) {
            return Err(ValidationError::QualityIndexOutOfRange(index));
        }
        Ok(())
    }
}

/// What the auto policy is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    pub temperature: Option<f64>,
    pub turbidity: Option<f64>,
    pub observed_at: Timestamp,
}

/// Verdicts for each metric of a reading; `None` where the value is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingClassification {
    pub temperature: Option<ReadingStatus>,
    pub turbidity: Option<ReadingStatus>,
    pub ph: Option<ReadingStatus>,
    pub quality_index: Option<ReadingStatus>,
}
