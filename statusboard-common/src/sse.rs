//! Server-Sent Events (SSE) utilities
//!
//! Streams [`StoreEvent`]s to browser clients so they know when to re-read
//! derived views.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::store::Store;

/// Interval between keep-alive comments
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Create an SSE stream of store events.
///
/// Sends an initial `ConnectionStatus` event, then one event per
/// [`StoreEvent`], named after its variant with the JSON body as data.
/// Lagging clients skip the events they missed.
pub fn create_store_event_stream(
    store: Arc<Store>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to store events");
    let mut rx = store.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let name = event.name();
                    match Event::default().event(name).json_data(&event) {
                        Ok(sse_event) => {
                            debug!("SSE: Sending {}", name);
                            yield Ok(sse_event);
                        }
                        Err(e) => warn!("SSE: Failed to encode {}: {}", name, e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE: Client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }

        info!("SSE: store event stream closed");
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
