//! Playlist upload API handlers
//!
//! POST /api/playlists, GET /api/playlists, DELETE /api/playlists

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use songgame_common::ingest::{IngestReport, LibraryOverview};
use songgame_common::Error;

use crate::{ApiResult, AppState};

/// POST /api/playlists query parameters
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Uploader name
    pub user: Option<String>,
    /// Declared playlist year; defaults to the current year
    pub year: Option<i32>,
}

/// POST /api/playlists response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub report: IngestReport,
}

/// POST /api/playlists?user=Emily&year=2024
///
/// Body is the raw CSV export.
pub async fn upload_playlist(
    State(state): State<AppState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    let Query(query) = query?;
    let user = query
        .user
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| Error::MissingInput("select a file and enter a user name".to_string()))?;
    let year = query.year.unwrap_or_else(|| chrono::Utc::now().year());

    let mut host = state.host.lock().await;
    let report = host.upload(&body, &user, year)?;

    Ok(Json(UploadResponse {
        message: format!(
            "Uploaded {} songs from {} ({})",
            report.songs_added, report.uploader, report.playlist_year
        ),
        report,
    }))
}

/// GET /api/playlists
///
/// Song counts per uploader and playlist year.
pub async fn get_overview(State(state): State<AppState>) -> Json<LibraryOverview> {
    let host = state.host.lock().await;
    Json(host.overview())
}

/// DELETE /api/playlists
///
/// Drops every upload and the duplicate-detection set.
pub async fn clear_playlists(State(state): State<AppState>) -> Json<LibraryOverview> {
    let mut host = state.host.lock().await;
    host.clear_uploads();
    Json(host.overview())
}

/// Build playlist routes
pub fn playlist_routes() -> Router<AppState> {
    Router::new().route(
        "/api/playlists",
        get(get_overview).post(upload_playlist).delete(clear_playlists),
    )
}
