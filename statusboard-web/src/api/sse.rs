//! Server-Sent Events (SSE) for store changes

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;

/// GET /api/events - SSE event stream of store changes
///
/// Streams events:
/// - ConnectionStatus (once, on connect)
/// - LoadStateChanged, DataCommitted, FiltersChanged
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    statusboard_common::sse::create_store_event_stream(Arc::clone(&state.store))
}
