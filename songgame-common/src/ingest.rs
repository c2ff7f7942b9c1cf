//! Playlist ingestion
//!
//! Parses exported playlist CSV files into [`Track`] rows, tags them with
//! the uploader and declared playlist year, and appends them to the shared
//! [`PlaylistLibrary`]. Uploads are deduplicated by SHA-256 of the raw file
//! bytes: re-uploading the same export is rejected as a whole.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::release_date::parse_release_year;
use crate::track::{Track, UNTAGGED_YEAR};
use crate::{Error, Result};

/// Column names retained from playlist exports
pub mod columns {
    pub const TRACK_URI: &str = "Track URI";
    pub const TRACK_NAME: &str = "Track Name";
    pub const ARTIST: &str = "Artist Name(s)";
    pub const DURATION_MS: &str = "Duration (ms)";
    pub const POPULARITY: &str = "Popularity";
    pub const EXPLICIT: &str = "Explicit";
    pub const RELEASE_DATE: &str = "Release Date";
    pub const USER: &str = "User";
    pub const PLAYLIST_YEAR: &str = "playlist year";
    pub const RELEASE_YEAR: &str = "release_year";
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub uploader: String,
    pub playlist_year: i32,
    pub songs_added: usize,
    /// Hex SHA-256 of the uploaded bytes
    pub digest: String,
}

/// Song count for one (uploader, playlist year) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewRow {
    pub uploader: String,
    pub playlist_year: i32,
    pub songs: usize,
}

/// Per-uploader breakdown plus totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryOverview {
    pub rows: Vec<OverviewRow>,
    pub total_songs: usize,
    pub total_uploaders: usize,
}

/// Shared in-memory playlist table
///
/// Append-only except for [`PlaylistLibrary::clear`].
#[derive(Debug, Default, Clone)]
pub struct PlaylistLibrary {
    tracks: Vec<Track>,
    seen_digests: HashSet<String>,
}

impl PlaylistLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Ingest one uploaded playlist export
    ///
    /// Fails without touching the table when the bytes were seen before
    /// (`DuplicateUpload`), when the file or uploader is missing
    /// (`MissingInput`), or when the CSV cannot be read (`MalformedFile`).
    pub fn ingest(&mut self, bytes: &[u8], uploader: &str, playlist_year: i32) -> Result<IngestReport> {
        let uploader = uploader.trim();
        if bytes.is_empty() {
            return Err(Error::MissingInput("select a playlist file".to_string()));
        }
        if uploader.is_empty() {
            return Err(Error::MissingInput("enter a user name".to_string()));
        }

        let digest = content_digest(bytes);
        if self.seen_digests.contains(&digest) {
            info!(uploader = %uploader, digest = %digest, "Duplicate playlist upload rejected");
            return Err(Error::DuplicateUpload);
        }

        let mut rows = parse_playlist(bytes)?;
        for row in &mut rows {
            row.uploader = uploader.to_string();
            row.playlist_year = playlist_year;
        }

        let songs_added = rows.len();
        self.tracks.extend(rows);
        self.seen_digests.insert(digest.clone());

        info!(
            uploader = %uploader,
            playlist_year,
            songs_added,
            total = self.tracks.len(),
            "Playlist uploaded"
        );

        Ok(IngestReport {
            uploader: uploader.to_string(),
            playlist_year,
            songs_added,
            digest,
        })
    }

    /// Drop every uploaded row and forget all seen digests
    pub fn clear(&mut self) {
        info!(removed = self.tracks.len(), "Clearing all uploaded playlists");
        self.tracks.clear();
        self.seen_digests.clear();
    }

    /// Song counts grouped by uploader and playlist year
    pub fn overview(&self) -> LibraryOverview {
        overview_of(&self.tracks)
    }
}

/// Song counts grouped by uploader and playlist year, sorted by both
pub fn overview_of(tracks: &[Track]) -> LibraryOverview {
    let mut counts: BTreeMap<(&str, i32), usize> = BTreeMap::new();
    let mut uploaders = BTreeSet::new();
    for track in tracks {
        *counts.entry((track.uploader.as_str(), track.playlist_year)).or_default() += 1;
        uploaders.insert(track.uploader.as_str());
    }

    LibraryOverview {
        rows: counts
            .into_iter()
            .map(|((uploader, playlist_year), songs)| OverviewRow {
                uploader: uploader.to_string(),
                playlist_year,
                songs,
            })
            .collect(),
        total_songs: tracks.len(),
        total_uploaders: uploaders.len(),
    }
}

/// Hex SHA-256 of a file's raw bytes
pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Parse a playlist CSV into rows
///
/// Only allow-listed columns are read; the rest are ignored. `User`,
/// `playlist year` and `release_year` are honoured when the file already
/// carries them (pre-tagged datasets); otherwise `release_year` is derived
/// from `Release Date`.
pub fn parse_playlist(bytes: &[u8]) -> Result<Vec<Track>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::MalformedFile("missing header row".to_string()));
    }
    let index = ColumnIndex::new(&headers);
    debug!(columns = headers.len(), "Parsed playlist header");

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        rows.push(index.track(&record, line + 2));
    }
    Ok(rows)
}

/// Load a pre-tagged dataset file (e.g. the bundled default playlist)
pub fn load_dataset(path: &Path) -> Result<Vec<Track>> {
    let bytes = std::fs::read(path)?;
    let rows = parse_playlist(&bytes)?;
    info!(path = %path.display(), rows = rows.len(), "Loaded playlist dataset");
    Ok(rows)
}

/// Positions of allow-listed columns in a header row
struct ColumnIndex {
    uri: Option<usize>,
    name: Option<usize>,
    artist: Option<usize>,
    duration_ms: Option<usize>,
    popularity: Option<usize>,
    explicit: Option<usize>,
    release_date: Option<usize>,
    user: Option<usize>,
    playlist_year: Option<usize>,
    release_year: Option<usize>,
}

impl ColumnIndex {
    fn new(headers: &csv::StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            uri: find(columns::TRACK_URI),
            name: find(columns::TRACK_NAME),
            artist: find(columns::ARTIST),
            duration_ms: find(columns::DURATION_MS),
            popularity: find(columns::POPULARITY),
            explicit: find(columns::EXPLICIT),
            release_date: find(columns::RELEASE_DATE),
            user: find(columns::USER),
            playlist_year: find(columns::PLAYLIST_YEAR),
            release_year: find(columns::RELEASE_YEAR),
        }
    }

    fn track(&self, record: &csv::StringRecord, line: usize) -> Track {
        let text = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        // A release date column always wins over a stored release_year
        let release_year = match self.release_date {
            Some(_) => text(self.release_date).and_then(|v| parse_release_year(&v)),
            None => text(self.release_year)
                .and_then(|v| parse_number::<f64>(&v))
                .map(|y| y as i32),
        };

        let duration_ms = text(self.duration_ms).and_then(|v| parse_number::<u64>(&v));
        if self.duration_ms.is_some() && duration_ms.is_none() {
            warn!(line, "Unreadable duration, leaving it empty");
        }

        Track {
            uri: text(self.uri),
            name: text(self.name),
            artist: text(self.artist),
            duration_ms,
            popularity: text(self.popularity).and_then(|v| parse_number::<u32>(&v)),
            explicit: text(self.explicit).and_then(|v| parse_flag(&v)),
            uploader: text(self.user).unwrap_or_default(),
            playlist_year: text(self.playlist_year)
                .and_then(|v| parse_number::<f64>(&v))
                .map(|y| y as i32)
                .unwrap_or(UNTAGGED_YEAR),
            release_year,
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMILY_CSV: &str = "\
Track URI,Track Name,Artist Name(s),Release Date,Duration (ms),Popularity,Explicit,Album Name
spotify:track:s1,S1,Art1,2020-01-01,200000,61,false,Album One
spotify:track:s2,S2,Art1,2019-05-05,180000,40,true,Album Two
";

    #[test]
    fn test_ingest_tags_rows() {
        let mut library = PlaylistLibrary::new();
        let report = library.ingest(EMILY_CSV.as_bytes(), "Emily", 2024).unwrap();

        assert_eq!(report.songs_added, 2);
        assert_eq!(report.uploader, "Emily");
        assert_eq!(library.len(), 2);

        let first = &library.tracks()[0];
        assert_eq!(first.name.as_deref(), Some("S1"));
        assert_eq!(first.artist.as_deref(), Some("Art1"));
        assert_eq!(first.uploader, "Emily");
        assert_eq!(first.playlist_year, 2024);
        assert_eq!(first.release_year, Some(2020));
        assert_eq!(first.duration_ms, Some(200_000));
        assert_eq!(first.popularity, Some(61));
        assert_eq!(first.explicit, Some(false));
        assert_eq!(library.tracks()[1].release_year, Some(2019));
        assert_eq!(library.tracks()[1].explicit, Some(true));
    }

    #[test]
    fn test_duplicate_upload_rejected() {
        let mut library = PlaylistLibrary::new();
        library.ingest(EMILY_CSV.as_bytes(), "Emily", 2024).unwrap();

        let err = library.ingest(EMILY_CSV.as_bytes(), "Noah", 2023).unwrap_err();
        assert!(matches!(err, Error::DuplicateUpload));
        assert_eq!(library.len(), 2);
        assert!(library.tracks().iter().all(|t| t.uploader == "Emily"));
    }

    #[test]
    fn test_missing_columns_tolerated() {
        let csv = "Track Name,Something Else\nOnly Name,x\n";
        let rows = parse_playlist(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("Only Name"));
        assert_eq!(rows[0].artist, None);
        assert_eq!(rows[0].uri, None);
        assert_eq!(rows[0].release_year, None);
    }

    #[test]
    fn test_unparseable_release_date_is_null() {
        let csv = "Track Name,Artist Name(s),Release Date\nA,B,someday\nC,D,1999\n";
        let rows = parse_playlist(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].release_year, None);
        assert_eq!(rows[1].release_year, Some(1999));
    }

    #[test]
    fn test_pretagged_dataset_columns_read() {
        let csv = "Track Name,Artist Name(s),User,playlist year,release_year\nA,B,Mia,2022,1984.0\nC,D,Leo,2021,\n";
        let rows = parse_playlist(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].uploader, "Mia");
        assert_eq!(rows[0].playlist_year, 2022);
        assert_eq!(rows[0].release_year, Some(1984));
        assert_eq!(rows[1].release_year, None);
    }

    #[test]
    fn test_release_date_overrides_stored_release_year() {
        let csv = "Track Name,Artist Name(s),Release Date,release_year\nA,B,2020-01-01,1990\nC,D,,1990\n";
        let rows = parse_playlist(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].release_year, Some(2020));
        assert_eq!(rows[1].release_year, None);
    }

    #[test]
    fn test_malformed_file_leaves_library_untouched() {
        let mut library = PlaylistLibrary::new();
        let bytes = b"Track Name,Artist Name(s)\n\xff\xfe,broken\n";
        let err = library.ingest(bytes, "Emily", 2024).unwrap_err();
        assert!(matches!(err, Error::MalformedFile(_)));
        assert!(library.is_empty());

        // A failed parse must not poison the digest set
        library.ingest(EMILY_CSV.as_bytes(), "Emily", 2024).unwrap();
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn test_missing_input() {
        let mut library = PlaylistLibrary::new();
        assert!(matches!(
            library.ingest(b"", "Emily", 2024),
            Err(Error::MissingInput(_))
        ));
        assert!(matches!(
            library.ingest(EMILY_CSV.as_bytes(), "   ", 2024),
            Err(Error::MissingInput(_))
        ));
    }

    #[test]
    fn test_clear_resets_digests() {
        let mut library = PlaylistLibrary::new();
        library.ingest(EMILY_CSV.as_bytes(), "Emily", 2024).unwrap();
        library.clear();
        assert!(library.is_empty());

        library.ingest(EMILY_CSV.as_bytes(), "Emily", 2024).unwrap();
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn test_overview_groups_by_uploader_and_year() {
        let mut library = PlaylistLibrary::new();
        library.ingest(EMILY_CSV.as_bytes(), "Emily", 2024).unwrap();
        library
            .ingest(b"Track Name,Artist Name(s)\nX,Y\n", "Emily", 2023)
            .unwrap();
        library
            .ingest(b"Track Name,Artist Name(s)\nZ,W\n", "Noah", 2024)
            .unwrap();

        let overview = library.overview();
        assert_eq!(overview.total_songs, 4);
        assert_eq!(overview.total_uploaders, 2);
        assert_eq!(
            overview.rows,
            vec![
                OverviewRow { uploader: "Emily".into(), playlist_year: 2023, songs: 1 },
                OverviewRow { uploader: "Emily".into(), playlist_year: 2024, songs: 2 },
                OverviewRow { uploader: "Noah".into(), playlist_year: 2024, songs: 1 },
            ]
        );
    }

    #[test]
    fn test_content_digest_is_sha256_hex() {
        let digest = content_digest(b"test content");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, format!("{:x}", Sha256::digest(b"test content")));
    }
}
