//! Game event types and broadcast bus
//!
//! Every user action that changes shared state emits a [`GameEvent`] so
//! all connected viewers can refresh. Delivery is best-effort: with no
//! subscribers the event is dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::scoreboard::PlayerScore;
use crate::session::{SongCard, StateTransition};

/// Events broadcast to viewers of the shared session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A playlist was ingested
    PlaylistUploaded {
        uploader: String,
        playlist_year: i32,
        songs_added: usize,
        total_songs: usize,
    },

    /// All uploads and seen digests were dropped
    UploadsCleared,

    PlayerAdded {
        name: String,
    },

    /// Snapshot drawn
    GameStarted {
        total_songs: usize,
        previous_release_year: Option<i32>,
    },

    SongPlayed {
        song: SongCard,
        current_player: Option<String>,
    },

    PointsAdded {
        player: String,
        delta: i64,
        total: i64,
    },

    GameFinished {
        winners: Vec<PlayerScore>,
    },

    GameRestarted,

    /// Any state machine transition
    StateChanged {
        transition: StateTransition,
    },
}

impl GameEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::PlaylistUploaded { .. } => "PlaylistUploaded",
            GameEvent::UploadsCleared => "UploadsCleared",
            GameEvent::PlayerAdded { .. } => "PlayerAdded",
            GameEvent::GameStarted { .. } => "GameStarted",
            GameEvent::SongPlayed { .. } => "SongPlayed",
            GameEvent::PointsAdded { .. } => "PointsAdded",
            GameEvent::GameFinished { .. } => "GameFinished",
            GameEvent::GameRestarted => "GameRestarted",
            GameEvent::StateChanged { .. } => "StateChanged",
        }
    }
}

/// Broadcast bus for [`GameEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GameEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: GameEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        bus.emit_lossy(GameEvent::PlayerAdded {
            name: "Emily".to_string(),
        });

        match rx.recv().await.unwrap() {
            GameEvent::PlayerAdded { name } => assert_eq!(name, "Emily"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let bus = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit_lossy(GameEvent::UploadsCleared);
        assert_eq!(bus.capacity(), 4);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(GameEvent::PointsAdded {
            player: "Emily".to_string(),
            delta: 3,
            total: 3,
        })
        .unwrap();
        assert_eq!(json["type"], "PointsAdded");
        assert_eq!(json["delta"], 3);
        assert_eq!(GameEvent::GameRestarted.event_type(), "GameRestarted");
    }
}
