//! Common error types for songgame

use thiserror::Error;

use crate::session::{GameAction, GameState};

/// Common result type for songgame operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by ingestion, the game session and configuration loading
///
/// Every variant is recoverable at the boundary where the user action was
/// invoked; none of them leave partially applied state behind.
#[derive(Error, Debug)]
pub enum Error {
    /// A file with the same content digest was already ingested
    #[error("This playlist has already been uploaded")]
    DuplicateUpload,

    /// The uploaded file could not be parsed as a playlist table
    #[error("Malformed playlist file: {0}")]
    MalformedFile(String),

    /// Upload submitted without a file or without an uploader name
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// No playlist data available to start a game
    #[error("No playlists loaded; upload a playlist first")]
    EmptyLibrary,

    /// Player is not part of the score ledger
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    /// Request parameter out of the accepted range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Action has no entry in the transition table for the current state
    #[error("Cannot {action} while game is {state}")]
    InvalidTransition {
        state: GameState,
        action: GameAction,
    },

    /// Players are frozen once a game snapshot exists
    #[error("Players are locked for this game")]
    PlayersLocked,

    /// Scores are frozen once the game is finished
    #[error("Game is finished; restart to play again")]
    GameFinished,

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::MalformedFile(err.to_string())
    }
}
