//! # songgame common library
//!
//! Core of the playlist party game:
//! - Track model and CSV playlist ingestion with upload deduplication
//! - Per-uploader sampling and play-order shuffle
//! - Game session state machine, turn order and scoreboard
//! - Game host tying the shared state together
//! - Configuration loading, events and SSE helpers

pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod ingest;
pub mod playback;
pub mod release_date;
pub mod sampler;
pub mod scoreboard;
pub mod session;
pub mod sse;
pub mod track;

pub use error::{Error, Result};
pub use host::{GameHost, GameView};
pub use session::{GameSession, GameState};
pub use track::Track;
