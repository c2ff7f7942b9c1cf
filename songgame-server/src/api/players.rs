//! Player and scoring API handlers
//!
//! POST /api/players, POST /api/players/points, GET /api/scoreboard

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use songgame_common::scoreboard::PlayerScore;

use crate::{ApiResult, AppState};

/// POST /api/players request
#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
}

/// POST /api/players response
#[derive(Debug, Serialize)]
pub struct AddPlayerResponse {
    /// False when the player already existed
    pub added: bool,
    pub players: Vec<PlayerScore>,
}

/// POST /api/players/points request
#[derive(Debug, Deserialize)]
pub struct AddPointsRequest {
    pub player: String,
    #[serde(default = "default_points")]
    pub points: i64,
}

fn default_points() -> i64 {
    1
}

/// POST /api/players/points response
#[derive(Debug, Serialize)]
pub struct AddPointsResponse {
    pub player: String,
    pub score: i64,
}

/// GET /api/scoreboard response
#[derive(Debug, Serialize)]
pub struct ScoreboardResponse {
    /// Sorted by score, highest first
    pub standings: Vec<PlayerScore>,
    pub players_locked: bool,
}

/// POST /api/players
///
/// Only accepted before the game starts.
pub async fn add_player(
    State(state): State<AppState>,
    request: Result<Json<AddPlayerRequest>, JsonRejection>,
) -> ApiResult<Json<AddPlayerResponse>> {
    let Json(request) = request?;
    let mut host = state.host.lock().await;
    let added = host.add_player(&request.name)?;
    Ok(Json(AddPlayerResponse {
        added,
        players: host.session().players().players().to_vec(),
    }))
}

/// POST /api/players/points
///
/// Points may be negative; rejected once the game is finished.
pub async fn add_points(
    State(state): State<AppState>,
    request: Result<Json<AddPointsRequest>, JsonRejection>,
) -> ApiResult<Json<AddPointsResponse>> {
    let Json(request) = request?;
    let mut host = state.host.lock().await;
    let score = host.add_points(&request.player, request.points)?;
    Ok(Json(AddPointsResponse {
        player: request.player,
        score,
    }))
}

/// GET /api/scoreboard
pub async fn get_scoreboard(State(state): State<AppState>) -> Json<ScoreboardResponse> {
    let host = state.host.lock().await;
    let view = host.view();
    Json(ScoreboardResponse {
        standings: view.standings,
        players_locked: view.players_locked,
    })
}

/// Build player routes
pub fn player_routes() -> Router<AppState> {
    Router::new()
        .route("/api/players", post(add_player))
        .route("/api/players/points", post(add_points))
        .route("/api/scoreboard", get(get_scoreboard))
}
