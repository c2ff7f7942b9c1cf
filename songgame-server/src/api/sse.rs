//! Server-Sent Events (SSE) for live game updates

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - SSE event stream for every viewer of the shared game
///
/// Streams events:
/// - ConnectionStatus (on connect)
/// - PlaylistUploaded, UploadsCleared, PlayerAdded, PointsAdded
/// - GameStarted, SongPlayed, GameFinished, GameRestarted, StateChanged
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    songgame_common::sse::game_event_stream(&state.event_bus)
}
