//! HTTP API handlers for songgame-server

pub mod game;
pub mod health;
pub mod players;
pub mod playlists;
pub mod sse;

pub use game::game_routes;
pub use health::health_routes;
pub use players::player_routes;
pub use playlists::playlist_routes;
pub use sse::event_stream;
