//! Handing track identifiers to an external player
//!
//! The game never plays audio itself. In auto-open mode the URI of each
//! played song is passed to a [`TrackLauncher`]; failures are reported to
//! the caller, who logs and carries on.

use std::sync::{Arc, Mutex};

/// Opens a track URI in whatever handles it on this machine
///
/// Called with the game lock held, so `open` must return without waiting
/// for the external player.
pub trait TrackLauncher: Send + Sync {
    fn open(&self, uri: &str) -> std::io::Result<()>;
}

/// Launcher that does nothing (link-only setups, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLauncher;

impl TrackLauncher for NoopLauncher {
    fn open(&self, _uri: &str) -> std::io::Result<()> {
        Ok(())
    }
}

/// Launcher that remembers every URI it was asked to open
#[derive(Debug, Default, Clone)]
pub struct RecordingLauncher {
    opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl TrackLauncher for RecordingLauncher {
    fn open(&self, uri: &str) -> std::io::Result<()> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(uri.to_string());
        }
        Ok(())
    }
}
