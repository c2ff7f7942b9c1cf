//! Process-wide game host
//!
//! [`GameHost`] owns everything the party shares: uploaded playlists, the
//! bundled fallback dataset, the game session and the event bus. Callers
//! serialize access (one action at a time); every method runs to
//! completion without blocking on I/O, except the one-time dataset load.
//! Track launchers are expected to hand off to the OS and return at once.

use std::path::Path;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{GameConfig, PlaybackMode};
use crate::events::{EventBus, GameEvent};
use crate::ingest::{load_dataset, IngestReport, LibraryOverview, PlaylistLibrary};
use crate::playback::TrackLauncher;
use crate::scoreboard::PlayerScore;
use crate::session::{GameSession, GameState, SongCard, StateTransition};
use crate::track::Track;
use crate::{Error, Result};

/// Everything a viewer needs to render the game screen
#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub state: GameState,
    pub game_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    /// Default draw size offered on the settings form
    pub songs_per_player: usize,
    pub max_songs_per_player: usize,
    /// Hidden once the game is finished
    pub current_song: Option<SongCard>,
    pub current_release_year_label: Option<String>,
    pub previous_release_year: Option<i32>,
    pub current_player: Option<String>,
    pub next_player: Option<String>,
    /// Remind players to stop the previous song before the next one
    pub pause_previous: bool,
    pub players_locked: bool,
    pub standings: Vec<PlayerScore>,
    pub winners: Vec<PlayerScore>,
    pub top_score: Option<i64>,
    pub playback: PlaybackMode,
    /// False when there are neither uploads nor a bundled dataset
    pub library_available: bool,
}

pub struct GameHost {
    config: GameConfig,
    library: PlaylistLibrary,
    default_dataset: OnceCell<Vec<Track>>,
    session: GameSession,
    events: EventBus,
    launcher: Box<dyn TrackLauncher>,
    rng: StdRng,
}

impl GameHost {
    pub fn new(config: GameConfig, events: EventBus, launcher: Box<dyn TrackLauncher>) -> Self {
        Self::with_rng(config, events, launcher, StdRng::from_entropy())
    }

    /// Host with a caller-supplied random source (deterministic tests)
    pub fn with_rng(
        config: GameConfig,
        events: EventBus,
        launcher: Box<dyn TrackLauncher>,
        rng: StdRng,
    ) -> Self {
        let session = GameSession::new(config.variant());
        Self {
            config,
            library: PlaylistLibrary::new(),
            default_dataset: OnceCell::new(),
            session,
            events,
            launcher,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn library(&self) -> &PlaylistLibrary {
        &self.library
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Ingest an uploaded playlist export
    pub fn upload(&mut self, bytes: &[u8], uploader: &str, playlist_year: i32) -> Result<IngestReport> {
        let (min, max) = (self.config.min_playlist_year, self.config.max_playlist_year);
        if !(min..=max).contains(&playlist_year) {
            return Err(Error::InvalidInput(format!(
                "playlist year must be between {} and {}",
                min, max
            )));
        }

        let report = self.library.ingest(bytes, uploader, playlist_year)?;
        self.events.emit_lossy(GameEvent::PlaylistUploaded {
            uploader: report.uploader.clone(),
            playlist_year: report.playlist_year,
            songs_added: report.songs_added,
            total_songs: self.library.len(),
        });
        Ok(report)
    }

    /// Administrative reset of all uploads; a running game keeps its snapshot
    pub fn clear_uploads(&mut self) {
        self.library.clear();
        self.events.emit_lossy(GameEvent::UploadsCleared);
    }

    /// Per-uploader/per-year counts of uploaded songs
    pub fn overview(&self) -> LibraryOverview {
        self.library.overview()
    }

    /// Tracks a new game would draw from: uploads first, else the bundled dataset
    pub fn library_view(&self) -> Result<&[Track]> {
        select_library(&self.library, &self.default_dataset, &self.config.default_dataset)
    }

    pub fn add_player(&mut self, name: &str) -> Result<bool> {
        let added = self.session.add_player(name)?;
        if added {
            self.events.emit_lossy(GameEvent::PlayerAdded {
                name: name.trim().to_string(),
            });
        }
        Ok(added)
    }

    pub fn add_points(&mut self, player: &str, delta: i64) -> Result<i64> {
        let total = self.session.add_points(player, delta)?;
        self.events.emit_lossy(GameEvent::PointsAdded {
            player: player.trim().to_string(),
            delta,
            total,
        });
        Ok(total)
    }

    /// Start a game drawing `songs_per_player` songs (config default when `None`)
    pub fn start_game(&mut self, songs_per_player: Option<usize>) -> Result<StateTransition> {
        let per_player = songs_per_player.unwrap_or(self.config.songs_per_player);
        if per_player == 0 || per_player > self.config.max_songs_per_player {
            return Err(Error::InvalidInput(format!(
                "songs per player must be between 1 and {}",
                self.config.max_songs_per_player
            )));
        }

        let tracks = select_library(&self.library, &self.default_dataset, &self.config.default_dataset)?;
        let transition = self.session.start(tracks, per_player, &mut self.rng)?;

        self.events.emit_lossy(GameEvent::GameStarted {
            total_songs: self.session.snapshot().len(),
            previous_release_year: self.session.previous_release_year(),
        });
        self.events.emit_lossy(GameEvent::StateChanged {
            transition: transition.clone(),
        });
        Ok(transition)
    }

    /// Present the next song; `None` once every song was played
    pub fn play_next(&mut self) -> Option<SongCard> {
        let advance = self.session.play_next()?;

        if self.config.playback == PlaybackMode::AutoOpen {
            match advance.song.uri.as_deref() {
                Some(uri) => {
                    if let Err(e) = self.launcher.open(uri) {
                        warn!(uri = %uri, error = %e, "Failed to open track in external player");
                    }
                }
                None => warn!(position = advance.song.position, "Track has no URI to open"),
            }
        }

        self.events.emit_lossy(GameEvent::SongPlayed {
            song: advance.song.clone(),
            current_player: self.session.current_player().map(str::to_string),
        });
        if advance.transition.old_state != advance.transition.new_state {
            self.events.emit_lossy(GameEvent::StateChanged {
                transition: advance.transition,
            });
        }
        Some(advance.song)
    }

    /// Close the game after the last song; returns the winners
    pub fn finish(&mut self) -> Result<Vec<PlayerScore>> {
        let result = self.session.finish()?;
        self.events.emit_lossy(GameEvent::GameFinished {
            winners: result.winners.clone(),
        });
        self.events.emit_lossy(GameEvent::StateChanged {
            transition: result.transition,
        });
        Ok(result.winners)
    }

    /// Back to an empty, not-started session (uploads are kept)
    pub fn restart(&mut self) {
        let transition = self.session.restart();
        self.events.emit_lossy(GameEvent::GameRestarted);
        self.events.emit_lossy(GameEvent::StateChanged { transition });
    }

    pub fn view(&self) -> GameView {
        let session = &self.session;
        let finished = session.state() == GameState::Finished;
        let current_song = if finished {
            None
        } else {
            session.current_song().cloned()
        };
        let winners = session.winners();

        GameView {
            state: session.state(),
            game_id: session.game_id(),
            started_at: session.started_at(),
            songs_per_player: self.config.songs_per_player,
            max_songs_per_player: self.config.max_songs_per_player,
            current_release_year_label: current_song.as_ref().map(SongCard::release_year_label),
            current_song,
            previous_release_year: session.previous_release_year(),
            current_player: session.current_player().map(str::to_string),
            next_player: session.next_player().map(str::to_string),
            pause_previous: session.should_pause_previous(),
            players_locked: session.state() != GameState::NotStarted,
            standings: session.players().standings(),
            top_score: winners.first().map(|w| w.score),
            winners,
            playback: self.config.playback,
            library_available: self.library_view().is_ok(),
        }
    }
}

fn select_library<'a>(
    library: &'a PlaylistLibrary,
    dataset: &'a OnceCell<Vec<Track>>,
    path: &Path,
) -> Result<&'a [Track]> {
    if !library.is_empty() {
        return Ok(library.tracks());
    }
    let fallback = dataset.get_or_init(|| load_default_dataset(path));
    if fallback.is_empty() {
        return Err(Error::EmptyLibrary);
    }
    Ok(fallback)
}

/// Load the bundled dataset once; absent or unreadable files yield no tracks
fn load_default_dataset(path: &Path) -> Vec<Track> {
    if !path.exists() {
        info!(path = %path.display(), "No bundled dataset; waiting for uploads");
        return Vec::new();
    }
    match load_dataset(path) {
        Ok(tracks) => tracks,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load bundled dataset");
            Vec::new()
        }
    }
}
