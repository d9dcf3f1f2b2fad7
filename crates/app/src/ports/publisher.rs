//! Publisher port — fan-out of committed states.

use std::future::Future;

use tambak_domain::aerator::AeratorSystemState;
use tambak_domain::error::TambakError;

/// Distributes committed states to viewers.
pub trait StatePublisher {
    /// Publish a state that has already been persisted.
    fn publish(
        &self,
        state: AeratorSystemState,
    ) -> impl Future<Output = Result<(), TambakError>> + Send;
}

impl<T: StatePublisher + Send + Sync> StatePublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        state: AeratorSystemState,
    ) -> impl Future<Output = Result<(), TambakError>> + Send {
        (**self).publish(state)
    }
}
