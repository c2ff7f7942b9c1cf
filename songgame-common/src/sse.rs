//! Server-Sent Events (SSE) utilities

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::events::EventBus;

const HEARTBEAT: Duration = Duration::from_secs(15);

/// SSE stream forwarding every [`GameEvent`](crate::events::GameEvent) on `bus`
///
/// Sends a `ConnectionStatus` event first, then each game event as JSON
/// with its variant name as the SSE event type. Lagging clients skip the
/// events they missed rather than disconnecting.
pub fn game_event_stream(bus: &EventBus) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to game events");
    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let event_type = event.event_type();
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            debug!("SSE: Broadcasting game event: {}", event_type);
                            yield Ok(Event::default().event(event_type).data(json));
                        }
                        Err(e) => {
                            warn!("SSE: Failed to serialize event {}: {}", event_type, e);
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "SSE: Client lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(HEARTBEAT).text("heartbeat"))
}
