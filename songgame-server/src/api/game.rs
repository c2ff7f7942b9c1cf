//! Game flow API handlers
//!
//! GET /api/game, POST /api/game/start, POST /api/game/next,
//! POST /api/game/finish, POST /api/game/restart

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use songgame_common::scoreboard::PlayerScore;
use songgame_common::session::SongCard;
use songgame_common::{GameState, GameView};

use crate::{ApiResult, AppState};

/// POST /api/game/start request; body may be omitted entirely
#[derive(Debug, Default, Deserialize)]
pub struct StartGameRequest {
    pub songs_per_player: Option<usize>,
}

/// POST /api/game/next response
#[derive(Debug, Serialize)]
pub struct PlayNextResponse {
    /// False when every song was already played
    pub advanced: bool,
    pub song: Option<SongCard>,
    pub state: GameState,
}

/// POST /api/game/finish response
#[derive(Debug, Serialize)]
pub struct FinishResponse {
    pub winners: Vec<PlayerScore>,
    pub top_score: Option<i64>,
    pub message: String,
}

/// GET /api/game
///
/// Full display surface of the shared game.
pub async fn get_game(State(state): State<AppState>) -> Json<GameView> {
    let host = state.host.lock().await;
    Json(host.view())
}

/// POST /api/game/start
pub async fn start_game(
    State(state): State<AppState>,
    request: Result<Json<StartGameRequest>, JsonRejection>,
) -> ApiResult<Json<GameView>> {
    // No JSON body means "use the configured default"
    let request = match request {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => StartGameRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let mut host = state.host.lock().await;
    let transition = host.start_game(request.songs_per_player)?;
    tracing::info!(
        game_id = ?transition.game_id,
        state = %transition.new_state,
        "Game started via API"
    );
    Ok(Json(host.view()))
}

/// POST /api/game/next
///
/// A call after the last song is a no-op that reports `advanced: false`.
pub async fn play_next(State(state): State<AppState>) -> Json<PlayNextResponse> {
    let mut host = state.host.lock().await;
    let played = host.play_next();
    let advanced = played.is_some();
    Json(PlayNextResponse {
        advanced,
        song: played.or_else(|| host.session().current_song().cloned()),
        state: host.session().state(),
    })
}

/// POST /api/game/finish
pub async fn finish_game(State(state): State<AppState>) -> ApiResult<Json<FinishResponse>> {
    let mut host = state.host.lock().await;
    let winners = host.finish()?;
    let top_score = winners.first().map(|w| w.score);
    Ok(Json(FinishResponse {
        message: winner_message(&winners),
        top_score,
        winners,
    }))
}

/// POST /api/game/restart
pub async fn restart_game(State(state): State<AppState>) -> Json<GameView> {
    let mut host = state.host.lock().await;
    host.restart();
    Json(host.view())
}

/// Announcement text for the winners of a finished game
pub fn winner_message(winners: &[PlayerScore]) -> String {
    match winners {
        [] => "No scores recorded.".to_string(),
        [winner] => format!("Winner: {} with {} points!", winner.name, winner.score),
        [first, ..] => {
            let names: Vec<&str> = winners.iter().map(|w| w.name.as_str()).collect();
            format!(
                "It's a tie! Winners: {} with {} points!",
                names.join(", "),
                first.score
            )
        }
    }
}

/// Build game routes
pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/api/game", get(get_game))
        .route("/api/game/start", post(start_game))
        .route("/api/game/next", post(play_next))
        .route("/api/game/finish", post(finish_game))
        .route("/api/game/restart", post(restart_game))
}
