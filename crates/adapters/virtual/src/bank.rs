//! Virtual aerator bank: eight relays behind a slow link.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tambak_app::ports::AeratorActuator;
use tambak_domain::aerator::Aerator;
use tambak_domain::error::TambakError;
use tambak_domain::id::AERATOR_COUNT;

use crate::error::VirtualActuatorError;

/// A simulated bank of aerator relays.
///
/// Each [`apply`](AeratorActuator::apply) sleeps for the configured latency,
/// then latches every relay to the requested status.
pub struct VirtualAeratorBank {
    latency: Duration,
    relays: Mutex<Vec<bool>>,
    offline: AtomicBool,
}

impl Default for VirtualAeratorBank {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl VirtualAeratorBank {
    /// Create a bank with every relay off.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            relays: Mutex::new(vec![false; usize::from(AERATOR_COUNT)]),
            offline: AtomicBool::new(false),
        }
    }

    /// Current relay positions, ordered by aerator id.
    #[must_use]
    pub fn statuses(&self) -> Vec<bool> {
        self.lock_relays().clone()
    }

    /// Simulate a lost link. While offline every command fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    #[must_use]
    pub fn latency(&self) -> Duration {
        self.latency
    }

    fn lock_relays(&self) -> MutexGuard<'_, Vec<bool>> {
        self.relays.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AeratorActuator for VirtualAeratorBank {
    async fn apply(&self, aerators: &[Aerator]) -> Result<(), TambakError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(VirtualActuatorError::Offline.into());
        }
        if aerators.len() != usize::from(AERATOR_COUNT) {
            return Err(VirtualActuatorError::WrongCount {
                expected: usize::from(AERATOR_COUNT),
                got: aerators.len(),
            }
            .into());
        }

        let mut relays = self.lock_relays();
        for aerator in aerators {
            relays[aerator.id.index()] = aerator.status;
        }
        let active = relays.iter().filter(|on| **on).count();
        drop(relays);
        tracing::debug!(active, "virtual aerator bank latched");
        Ok(())
    }
}
