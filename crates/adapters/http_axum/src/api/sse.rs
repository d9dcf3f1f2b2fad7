//! Server-Sent Events (SSE) stream of aerator state.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use tambak_app::ports::{AeratorActuator, AeratorStateStore, SensorReadingSink, SensorReadingSource};
use tambak_domain::aerator::AeratorSystemState;

use super::StateView;
use crate::state::AppState;

fn to_event(state: AeratorSystemState) -> Option<Result<Event, Infallible>> {
    match Event::default().event("state").json_data(StateView::from(state)) {
        Ok(event) => Some(Ok(event)),
        Err(err) => {
            tracing::warn!(%err, "failed to serialize state for SSE stream");
            None
        }
    }
}

/// `GET /api/events` — SSE stream of committed aerator states.
///
/// The first frame is the current state; every later commit follows in
/// order. A viewer that falls too far behind skips to the newest states.
/// The stream ends when the client disconnects.
pub async fn stream<S, A, R>(
    State(state): State<AppState<S, A, R>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: AeratorStateStore + Send + Sync + 'static,
    A: AeratorActuator + Send + Sync + 'static,
    R: SensorReadingSource + SensorReadingSink + Send + Sync + 'static,
{
    let (snapshot, receiver) = state.hub.subscribe().into_parts();
    tracing::debug!(viewers = state.hub.subscriber_count(), "viewer connected");

    let updates = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(state) => Some(state),
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE viewer lagged, some states were dropped");
            None
        }
    });
    let events = tokio_stream::iter(snapshot)
        .chain(updates)
        .filter_map(to_event);

    Sse::new(events).keep_alive(KeepAlive::default())
}
