//! Player ledger: turn order and scores

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One player's standing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub name: String,
    pub score: i64,
}

/// Players in turn order with their scores
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    players: Vec<PlayerScore>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Players in insertion (turn) order
    pub fn players(&self) -> &[PlayerScore] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    /// Append a player with score 0
    ///
    /// Returns `false` (and changes nothing) when the name is already taken.
    pub fn add_player(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.players.push(PlayerScore {
            name: name.to_string(),
            score: 0,
        });
        true
    }

    /// Add `delta` (possibly negative) to a player's score; returns the new total
    pub fn add_points(&mut self, name: &str, delta: i64) -> Result<i64> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownPlayer(name.to_string()))?;
        player.score = player.score.saturating_add(delta);
        Ok(player.score)
    }

    pub fn score(&self, name: &str) -> Option<i64> {
        self.players.iter().find(|p| p.name == name).map(|p| p.score)
    }

    /// Player at a turn position
    pub fn player_at(&self, turn: usize) -> Option<&str> {
        self.players.get(turn).map(|p| p.name.as_str())
    }

    /// Scoreboard sorted by score, highest first; ties keep turn order
    pub fn standings(&self) -> Vec<PlayerScore> {
        let mut sorted = self.players.clone();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted
    }

    /// All players sharing the maximum score, in turn order
    pub fn winners(&self) -> Vec<PlayerScore> {
        let Some(max) = self.players.iter().map(|p| p.score).max() else {
            return Vec::new();
        };
        self.players.iter().filter(|p| p.score == max).cloned().collect()
    }
}
