//! In-process fan-out of aerator state, backed by a tokio broadcast channel.
//!
//! The hub remembers the most recent state so a new subscriber gets a
//! snapshot on connect, then every later publish in order. Recording the
//! snapshot and sending happen under one lock, and [`BroadcastHub::subscribe`]
//! takes the same lock, so a subscriber never sees a state older than its
//! snapshot.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use tambak_domain::aerator::AeratorSystemState;
use tambak_domain::error::TambakError;

use crate::ports::StatePublisher;

/// Fan-out hub for committed [`AeratorSystemState`]s.
///
/// Publishing never blocks: a subscriber that falls more than `capacity`
/// states behind skips ahead to the newest ones.
pub struct BroadcastHub {
    sender: broadcast::Sender<AeratorSystemState>,
    latest: Mutex<AeratorSystemState>,
}

impl BroadcastHub {
    /// Create a hub seeded with `initial`. `capacity` is clamped to at least 1.
    #[must_use]
    pub fn new(capacity: usize, initial: AeratorSystemState) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            latest: Mutex::new(initial),
        }
    }

    /// Subscribe, receiving the current state first.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let latest = self.lock();
        Subscription {
            pending_snapshot: Some(latest.clone()),
            receiver: self.sender.subscribe(),
        }
    }

    /// The most recently published state.
    #[must_use]
    pub fn latest(&self) -> AeratorSystemState {
        self.lock().clone()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn lock(&self) -> MutexGuard<'_, AeratorSystemState> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatePublisher for BroadcastHub {
    fn publish(
        &self,
        state: AeratorSystemState,
    ) -> impl Future<Output = Result<(), TambakError>> + Send {
        let mut latest = self.lock();
        *latest = state.clone();
        // send fails only when nobody is listening
        let _ = self.sender.send(state);
        drop(latest);
        async { Ok(()) }
    }
}

/// One viewer's stream of states. Dropping it unsubscribes.
pub struct Subscription {
    pending_snapshot: Option<AeratorSystemState>,
    receiver: broadcast::Receiver<AeratorSystemState>,
}

impl Subscription {
    /// Split into the connect-time snapshot and the receiver for later states.
    ///
    /// For callers that drive the receiver themselves, e.g. as a stream.
    #[must_use]
    pub fn into_parts(self) -> (Option<AeratorSystemState>, broadcast::Receiver<AeratorSystemState>) {
        (self.pending_snapshot, self.receiver)
    }

    /// Next state for this subscriber, or `None` once the hub is gone.
    ///
    /// In-process consumers (a [`ControlSurface`](crate::control_surface::ControlSurface)
    /// fed by [`ControlSurface::reconcile`](crate::control_surface::ControlSurface::reconcile),
    /// or a test) read states through this. The HTTP event stream uses
    /// [`Subscription::into_parts`] instead.
    pub async fn next(&mut self) -> Option<AeratorSystemState> {
        if let Some(snapshot) = self.pending_snapshot.take() {
            return Some(snapshot);
        }
        loop {
            match self.receiver.recv().await {
                Ok(state) => return Some(state),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "state subscriber lagged, skipping ahead");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
