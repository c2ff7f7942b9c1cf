//! Game session state machine
//!
//! A session moves through four states:
//!
//! ```text
//! NotStarted --start--> InProgress --play next (last song)--> AllPlayed --finish--> Finished
//!      ^                   |  ^                                                       |
//!      |                   +--+ play next                                             |
//!      +------------------------------------ restart (from any state) ---------------+
//! ```
//!
//! Starting on an empty draw jumps straight to `AllPlayed`. Every
//! transition is looked up in [`TRANSITIONS`]; callers never infer the
//! state from the cursor.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GameVariant;
use crate::sampler::{draw_snapshot, seed_previous_year};
use crate::scoreboard::{PlayerScore, Scoreboard};
use crate::track::{Track, UNTAGGED_YEAR};
use crate::{Error, Result};

/// Display text for a song without a known release year
pub const UNKNOWN_YEAR: &str = "Unknown";

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// No snapshot; players may still join
    NotStarted,
    /// Songs left to play
    InProgress,
    /// Every song played; last song can still be scored
    AllPlayed,
    /// Winners announced; only restart is accepted
    Finished,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameState::NotStarted => "not started",
            GameState::InProgress => "in progress",
            GameState::AllPlayed => "all played",
            GameState::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// Actions that move the session between states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameAction {
    /// Start with at least one drawn song
    Start,
    /// Start where the draw came back empty
    StartEmpty,
    /// Play a song that is not the last one
    PlayNext,
    /// Play the last song of the snapshot
    PlayLast,
    Finish,
    Restart,
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameAction::Start | GameAction::StartEmpty => "start",
            GameAction::PlayNext | GameAction::PlayLast => "play next song",
            GameAction::Finish => "finish",
            GameAction::Restart => "restart",
        };
        f.write_str(label)
    }
}

/// (from, action, to). Restart is accepted from every state and is not listed.
pub const TRANSITIONS: &[(GameState, GameAction, GameState)] = &[
    (GameState::NotStarted, GameAction::Start, GameState::InProgress),
    (GameState::NotStarted, GameAction::StartEmpty, GameState::AllPlayed),
    (GameState::InProgress, GameAction::PlayNext, GameState::InProgress),
    (GameState::InProgress, GameAction::PlayLast, GameState::AllPlayed),
    (GameState::AllPlayed, GameAction::Finish, GameState::Finished),
];

/// Look up the state reached by applying `action` in `from`
pub fn next_state(from: GameState, action: GameAction) -> Option<GameState> {
    if action == GameAction::Restart {
        return Some(GameState::NotStarted);
    }
    TRANSITIONS
        .iter()
        .find(|(state, act, _)| *state == from && *act == action)
        .map(|(_, _, to)| *to)
}

/// Record of one state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// Game the change belongs to; `None` once a restart wiped it
    pub game_id: Option<Uuid>,
    pub old_state: GameState,
    pub new_state: GameState,
    pub transitioned_at: DateTime<Utc>,
}

/// Everything shown about the song currently being played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongCard {
    /// 1-based position in the snapshot
    pub position: usize,
    pub total: usize,
    pub track: Option<String>,
    pub artist: Option<String>,
    pub release_year: Option<i32>,
    /// Distinct playlist years this song appears under, ascending
    pub playlist_years: Vec<i32>,
    /// Distinct uploaders whose playlists contain this song, sorted
    pub uploaders: Vec<String>,
    /// Playback identifier handed to the music service
    pub uri: Option<String>,
    pub web_url: Option<String>,
}

impl SongCard {
    pub fn release_year_label(&self) -> String {
        match self.release_year {
            Some(year) => year.to_string(),
            None => UNKNOWN_YEAR.to_string(),
        }
    }
}

/// Result of a `play_next` call that advanced the cursor
#[derive(Debug, Clone)]
pub struct Advance {
    pub song: SongCard,
    pub turn: usize,
    pub transition: StateTransition,
}

/// Result of `finish`
#[derive(Debug, Clone)]
pub struct FinalResult {
    pub winners: Vec<PlayerScore>,
    pub transition: StateTransition,
}

/// The single shared game session
///
/// Constructed fully formed by [`GameSession::new`]; [`GameSession::restart`]
/// puts it back to exactly that state.
#[derive(Debug, Clone)]
pub struct GameSession {
    variant: GameVariant,
    state: GameState,
    game_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    snapshot: Vec<Track>,
    /// Library as it was at start; used to aggregate uploaders/years per song
    pool: Vec<Track>,
    cursor: usize,
    current_song: Option<SongCard>,
    turn: usize,
    previous_release_year: Option<i32>,
    current_release_year: Option<i32>,
    players: Scoreboard,
}

impl GameSession {
    pub fn new(variant: GameVariant) -> Self {
        Self {
            variant,
            state: GameState::NotStarted,
            game_id: None,
            started_at: None,
            snapshot: Vec::new(),
            pool: Vec::new(),
            cursor: 0,
            current_song: None,
            turn: 0,
            previous_release_year: None,
            current_release_year: None,
            players: Scoreboard::new(),
        }
    }

    pub fn variant(&self) -> &GameVariant {
        &self.variant
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn game_id(&self) -> Option<Uuid> {
        self.game_id
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn snapshot(&self) -> &[Track] {
        &self.snapshot
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_song(&self) -> Option<&SongCard> {
        self.current_song.as_ref()
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Release year of the previously played song (or the synthetic seed)
    pub fn previous_release_year(&self) -> Option<i32> {
        self.previous_release_year
    }

    pub fn players(&self) -> &Scoreboard {
        &self.players
    }

    /// Player whose turn it is
    pub fn current_player(&self) -> Option<&str> {
        self.players.player_at(self.turn)
    }

    /// Player whose turn it will be after the next song
    pub fn next_player(&self) -> Option<&str> {
        if self.players.is_empty() {
            return None;
        }
        self.players.player_at((self.turn + 1) % self.players.len())
    }

    /// Whether the previous song is probably still playing
    pub fn should_pause_previous(&self) -> bool {
        self.state == GameState::InProgress && self.cursor > 0
    }

    /// Register a player; `Ok(false)` when the name is already present
    pub fn add_player(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::MissingInput("enter a player name".to_string()));
        }
        if self.state != GameState::NotStarted {
            return Err(Error::PlayersLocked);
        }
        let added = self.players.add_player(name);
        if added {
            info!(player = %name, players = self.players.len(), "Player added");
        }
        Ok(added)
    }

    /// Add points to a player; accepted until the game is finished
    pub fn add_points(&mut self, name: &str, delta: i64) -> Result<i64> {
        let name = name.trim();
        if self.state == GameState::Finished {
            return Err(Error::GameFinished);
        }
        let total = self.players.add_points(name, delta)?;
        info!(player = %name, delta, total, "Points added");
        Ok(total)
    }

    /// Draw the snapshot from `library` and begin the game
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        library: &[Track],
        per_player: usize,
        rng: &mut R,
    ) -> Result<StateTransition> {
        if next_state(self.state, GameAction::Start).is_none() {
            return Err(Error::InvalidTransition {
                state: self.state,
                action: GameAction::Start,
            });
        }
        if per_player == 0 {
            return Err(Error::InvalidInput(
                "songs per player must be at least 1".to_string(),
            ));
        }
        if library.is_empty() {
            return Err(Error::EmptyLibrary);
        }

        let snapshot = draw_snapshot(library, per_player, rng);
        let previous = if self.variant.year_guessing {
            seed_previous_year(library, rng)
        } else {
            None
        };
        let action = if snapshot.is_empty() {
            GameAction::StartEmpty
        } else {
            GameAction::Start
        };

        self.game_id = Some(Uuid::new_v4());
        self.started_at = Some(Utc::now());
        self.snapshot = snapshot;
        self.pool = library.to_vec();
        self.cursor = 0;
        self.current_song = None;
        self.turn = 0;
        self.previous_release_year = previous;
        self.current_release_year = None;

        info!(
            songs = self.snapshot.len(),
            per_player,
            players = self.players.len(),
            seeded_year = ?previous,
            "Game started"
        );
        self.transition(action)
    }

    /// Play the song at the cursor
    ///
    /// Returns `None` without changing anything once the snapshot is
    /// exhausted (or before a game exists).
    pub fn play_next(&mut self) -> Option<Advance> {
        if self.state != GameState::InProgress || self.cursor >= self.snapshot.len() {
            debug!(cursor = self.cursor, state = %self.state, "play_next ignored");
            return None;
        }

        let row = self.snapshot[self.cursor].clone();

        let mut years = BTreeSet::new();
        let mut uploaders = BTreeSet::new();
        for other in self.pool.iter().filter(|t| t.same_song(&row)) {
            years.insert(other.playlist_year);
            uploaders.insert(other.uploader.clone());
        }
        // The snapshot row itself always counts, even if the pool lost it
        years.insert(row.playlist_year);
        uploaders.insert(row.uploader.clone());
        // Untagged dataset rows carry no playlist year
        years.remove(&UNTAGGED_YEAR);
        uploaders.remove("");

        if self.variant.year_guessing {
            if self.current_release_year.is_some() {
                self.previous_release_year = self.current_release_year;
            }
            self.current_release_year = row.release_year;
        }

        let song = SongCard {
            position: self.cursor + 1,
            total: self.snapshot.len(),
            web_url: row.web_url(),
            track: row.name,
            artist: row.artist,
            release_year: row.release_year,
            playlist_years: years.into_iter().collect(),
            uploaders: uploaders.into_iter().collect(),
            uri: row.uri,
        };
        self.current_song = Some(song.clone());

        self.cursor += 1;
        if !self.players.is_empty() {
            self.turn = (self.turn + 1) % self.players.len();
        }

        let action = if self.cursor == self.snapshot.len() {
            GameAction::PlayLast
        } else {
            GameAction::PlayNext
        };
        info!(
            position = song.position,
            total = song.total,
            track = ?song.track,
            turn = self.turn,
            "Song played"
        );

        // InProgress accepts both PlayNext and PlayLast
        let transition = self.transition(action).ok()?;
        Some(Advance {
            song,
            turn: self.turn,
            transition,
        })
    }

    /// End the game after the last song and announce the winners
    pub fn finish(&mut self) -> Result<FinalResult> {
        let transition = self.transition(GameAction::Finish)?;
        let winners = self.players.winners();
        info!(
            winners = ?winners.iter().map(|w| w.name.as_str()).collect::<Vec<_>>(),
            "Game finished"
        );
        Ok(FinalResult { winners, transition })
    }

    /// Winners of a finished game; empty otherwise
    pub fn winners(&self) -> Vec<PlayerScore> {
        if self.state == GameState::Finished {
            self.players.winners()
        } else {
            Vec::new()
        }
    }

    /// Wipe snapshot, cursor, turn, players and cached years
    pub fn restart(&mut self) -> StateTransition {
        let old_state = self.state;
        let game_id = self.game_id;
        *self = GameSession::new(self.variant.clone());
        info!(game_id = ?game_id, from = %old_state, "Game restarted");
        StateTransition {
            game_id,
            old_state,
            new_state: GameState::NotStarted,
            transitioned_at: Utc::now(),
        }
    }

    fn transition(&mut self, action: GameAction) -> Result<StateTransition> {
        let new_state = next_state(self.state, action).ok_or(Error::InvalidTransition {
            state: self.state,
            action,
        })?;
        let transition = StateTransition {
            game_id: self.game_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        if transition.old_state != new_state {
            debug!(from = %transition.old_state, to = %new_state, %action, "Game state changed");
        }
        self.state = new_state;
        Ok(transition)
    }
}
