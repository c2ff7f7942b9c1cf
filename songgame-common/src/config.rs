//! Configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line overrides (highest priority)
//! 2. Environment variables (`SONGGAME_*`)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// How the track identifier is handed to the music service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Only expose the URI / web link to the viewer
    Link,
    /// Also open the URI with the OS default handler when a song is played
    AutoOpen,
}

impl std::str::FromStr for PlaybackMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "link" => Ok(PlaybackMode::Link),
            "auto_open" | "open" => Ok(PlaybackMode::AutoOpen),
            other => Err(Error::Config(format!("unknown playback mode: {}", other))),
        }
    }
}

/// Which flavour of the party flow to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameVariant {
    pub playback: PlaybackMode,
    /// Track the "previous song was released in" hint
    pub year_guessing: bool,
}

impl Default for GameVariant {
    fn default() -> Self {
        Self {
            playback: PlaybackMode::Link,
            year_guessing: true,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub bind_address: String,
    /// Default number of songs drawn from each uploader
    pub songs_per_player: usize,
    pub max_songs_per_player: usize,
    pub min_playlist_year: i32,
    pub max_playlist_year: i32,
    /// Bundled dataset used when nothing was uploaded
    pub default_dataset: PathBuf,
    pub playback: PlaybackMode,
    pub year_guessing: bool,
    /// Broadcast channel capacity for SSE events
    pub event_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8501".to_string(),
            songs_per_player: 10,
            max_songs_per_player: 50,
            min_playlist_year: 2000,
            max_playlist_year: 2030,
            default_dataset: PathBuf::from("filtered_list.csv"),
            playback: PlaybackMode::Link,
            year_guessing: true,
            event_capacity: 100,
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub songs_per_player: Option<usize>,
    pub default_dataset: Option<PathBuf>,
    pub playback: Option<PlaybackMode>,
    pub year_guessing: Option<bool>,
}

impl GameConfig {
    /// Resolve configuration from all sources and validate it
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        // Priority 3: TOML config file
        let mut config = match overrides.config_file.clone().or_else(default_config_file) {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading config file");
                Self::from_file(&path)?
            }
            Some(path) if overrides.config_file.is_some() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => {
                info!("No config file found, using defaults");
                Self::default()
            }
        };

        // Priority 2: Environment variables
        config.apply_env()?;

        // Priority 1: Command-line overrides
        config.apply_overrides(overrides);

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var("SONGGAME_BIND_ADDRESS") {
            self.bind_address = v;
        }
        if let Ok(v) = std::env::var("SONGGAME_SONGS_PER_PLAYER") {
            self.songs_per_player = v
                .parse()
                .map_err(|_| Error::Config(format!("SONGGAME_SONGS_PER_PLAYER: not a number: {}", v)))?;
        }
        if let Ok(v) = std::env::var("SONGGAME_DEFAULT_DATASET") {
            self.default_dataset = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SONGGAME_PLAYBACK") {
            self.playback = v.parse()?;
        }
        if let Ok(v) = std::env::var("SONGGAME_YEAR_GUESSING") {
            self.year_guessing = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    warn!(value = %v, "Ignoring unrecognised SONGGAME_YEAR_GUESSING");
                    self.year_guessing
                }
            };
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = &overrides.bind_address {
            self.bind_address = v.clone();
        }
        if let Some(v) = overrides.songs_per_player {
            self.songs_per_player = v;
        }
        if let Some(v) = &overrides.default_dataset {
            self.default_dataset = v.clone();
        }
        if let Some(v) = overrides.playback {
            self.playback = v;
        }
        if let Some(v) = overrides.year_guessing {
            self.year_guessing = v;
        }
    }

    /// Reject settings the game cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_songs_per_player == 0 {
            return Err(Error::Config("max_songs_per_player must be at least 1".to_string()));
        }
        if self.songs_per_player == 0 || self.songs_per_player > self.max_songs_per_player {
            return Err(Error::Config(format!(
                "songs_per_player must be between 1 and {}",
                self.max_songs_per_player
            )));
        }
        if self.min_playlist_year > self.max_playlist_year {
            return Err(Error::Config(
                "min_playlist_year is after max_playlist_year".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn variant(&self) -> GameVariant {
        GameVariant {
            playback: self.playback,
            year_guessing: self.year_guessing,
        }
    }
}

/// `<config dir>/songgame/config.toml`, e.g. `~/.config/songgame/config.toml`
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songgame").join("config.toml"))
}
