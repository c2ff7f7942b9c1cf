//! Track record and song identity

use serde::{Deserialize, Serialize};

/// `playlist_year` of dataset rows that lack a `playlist year` column
pub const UNTAGGED_YEAR: i32 = 0;

/// One row of the shared playlist table
///
/// Source columns are optional because exported playlists vary in which
/// columns they carry. `uploader` and `playlist_year` are always set for
/// uploads; pre-tagged datasets may leave them empty / [`UNTAGGED_YEAR`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Playback identifier, e.g. `spotify:track:4uLU6hMCjMI75M1A2tKUQC`
    pub uri: Option<String>,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub duration_ms: Option<u64>,
    pub popularity: Option<u32>,
    pub explicit: Option<bool>,
    /// Who uploaded the playlist this row came from
    pub uploader: String,
    /// Year the uploader declared for the playlist
    pub playlist_year: i32,
    /// Year derived from the release date column, if parseable
    pub release_year: Option<i32>,
}

/// Identity used for "same song" comparisons
///
/// Two rows with equal name and artist are one logical song, regardless
/// of URI or uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SongKey<'a> {
    pub name: Option<&'a str>,
    pub artist: Option<&'a str>,
}

impl Track {
    pub fn key(&self) -> SongKey<'_> {
        SongKey {
            name: self.name.as_deref(),
            artist: self.artist.as_deref(),
        }
    }

    /// Whether `other` is the same logical song
    pub fn same_song(&self, other: &Track) -> bool {
        self.key() == other.key()
    }

    /// Browser link for the track
    ///
    /// `spotify:<kind>:<id>` URIs are rewritten to their open.spotify.com
    /// form; http(s) URIs pass through; anything else has no web link.
    pub fn web_url(&self) -> Option<String> {
        let uri = self.uri.as_deref()?;
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Some(uri.to_string());
        }
        let mut parts = uri.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("spotify"), Some(kind), Some(id)) if !kind.is_empty() && !id.is_empty() => {
                Some(format!("https://open.spotify.com/{}/{}", kind, id))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_track(name: &str, artist: &str, uploader: &str) -> Track {
    Track {
        uri: Some(format!("spotify:track:{}", name.to_lowercase())),
        name: Some(name.to_string()),
        artist: Some(artist.to_string()),
        duration_ms: Some(180_000),
        popularity: Some(50),
        explicit: Some(false),
        uploader: uploader.to_string(),
        playlist_year: 2024,
        release_year: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_song_ignores_uri_and_uploader() {
        let a = sample_track("Song", "Artist", "Emily");
        let mut b = sample_track("Song", "Artist", "Noah");
        b.uri = Some("spotify:track:other".to_string());
        assert!(a.same_song(&b));
    }

    #[test]
    fn test_same_song_differs_by_artist() {
        let a = sample_track("Song", "Artist", "Emily");
        let b = sample_track("Song", "Other Artist", "Emily");
        assert!(!a.same_song(&b));
    }

    #[test]
    fn test_web_url_from_spotify_uri() {
        let mut track = sample_track("Song", "Artist", "Emily");
        track.uri = Some("spotify:track:4uLU6hMCjMI75M1A2tKUQC".to_string());
        assert_eq!(
            track.web_url().as_deref(),
            Some("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC")
        );
    }

    #[test]
    fn test_web_url_passthrough_and_missing() {
        let mut track = sample_track("Song", "Artist", "Emily");
        track.uri = Some("https://example.com/t/1".to_string());
        assert_eq!(track.web_url().as_deref(), Some("https://example.com/t/1"));

        track.uri = Some("local:file".to_string());
        assert_eq!(track.web_url(), None);

        track.uri = None;
        assert_eq!(track.web_url(), None);
    }
}
