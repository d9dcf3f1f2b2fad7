//! Durable record of the aerator bank.

use std::future::Future;

use tambak_domain::aerator::AeratorSystemState;
use tambak_domain::error::TambakError;

/// Reads and replaces the persisted [`AeratorSystemState`].
///
/// `write` replaces the whole record atomically: a concurrent reader sees
/// either the previous state or the new one, never a mix. Serializing
/// read-modify-write cycles is the caller's job.
pub trait AeratorStateStore {
    /// Load the current state.
    fn read(&self) -> impl Future<Output = Result<AeratorSystemState, TambakError>> + Send;

    /// Persist `state`, returning what was stored.
    ///
    /// Must fail with [`TambakError::Persistence`] unless the write is durable.
    fn write(
        &self,
        state: AeratorSystemState,
    ) -> impl Future<Output = Result<AeratorSystemState, TambakError>> + Send;
}

impl<T: AeratorStateStore + Send + Sync> AeratorStateStore for std::sync::Arc<T> {
    fn read(&self) -> impl Future<Output = Result<AeratorSystemState, TambakError>> + Send {
        (**self).read()
    }

    fn write(
        &self,
        state: AeratorSystemState,
    ) -> impl Future<Output = Result<AeratorSystemState, TambakError>> + Send {
        (**self).write(state)
    }
}
