//! songgame-server library
//!
//! HTTP + SSE front for the shared party game. Every handler locks the one
//! [`GameHost`] for the whole action, so user actions are applied strictly
//! one after another.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use songgame_common::events::EventBus;
use songgame_common::GameHost;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod launcher;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single game host; held for the full duration of each action
    pub host: Arc<Mutex<GameHost>>,
    /// Event bus for SSE broadcasting (same bus the host emits on)
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(host: GameHost) -> Self {
        let event_bus = host.events().clone();
        Self {
            host: Arc::new(Mutex::new(host)),
            event_bus,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::playlist_routes())
        .merge(api::player_routes())
        .merge(api::game_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
