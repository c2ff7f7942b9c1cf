//! OS-level track launcher for auto-open mode

use std::io;
use std::thread;

use songgame_common::playback::TrackLauncher;
use tracing::{debug, warn};

type OpenFn = fn(&str) -> io::Result<()>;

/// Opens track URIs with the system's default handler
/// (e.g. `spotify:` URIs in the desktop client)
///
/// The handler is started on its own thread: `xdg-open` and friends are
/// waited on, and the caller holds the game lock.
#[derive(Debug, Clone, Copy)]
pub struct SystemLauncher {
    open_with: OpenFn,
}

impl SystemLauncher {
    pub fn new() -> Self {
        Self {
            open_with: webbrowser::open,
        }
    }

    #[cfg(test)]
    fn with_opener(open_with: OpenFn) -> Self {
        Self { open_with }
    }
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackLauncher for SystemLauncher {
    fn open(&self, uri: &str) -> io::Result<()> {
        debug!(uri = %uri, "Opening track with system handler");
        let open_with = self.open_with;
        let uri = uri.to_string();
        thread::Builder::new()
            .name("track-launcher".to_string())
            .spawn(move || {
                if let Err(e) = open_with(&uri) {
                    warn!(uri = %uri, error = %e, "System handler failed to open track");
                }
            })?;
        Ok(())
    }
}
