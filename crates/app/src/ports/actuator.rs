//! Actuator port: drives the physical aerators.

use std::future::Future;

use tambak_domain::aerator::Aerator;
use tambak_domain::error::TambakError;

/// Pushes desired on/off statuses to the aerator hardware.
pub trait AeratorActuator {
    /// Apply every status in `aerators` and wait for acknowledgement.
    ///
    /// Fails with [`TambakError::Actuator`] when the hardware does not confirm.
    fn apply(&self, aerators: &[Aerator]) -> impl Future<Output = Result<(), TambakError>> + Send;
}

impl<T: AeratorActuator + Send + Sync> AeratorActuator for std::sync::Arc<T> {
    fn apply(&self, aerators: &[Aerator]) -> impl Future<Output = Result<(), TambakError>> + Send {
        (**self).apply(aerators)
    }
}
