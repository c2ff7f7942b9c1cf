//! End-to-end game flow through the GameHost
//!
//! Tests cover:
//! - Upload deduplication by content
//! - Per-uploader draw sizes
//! - Cursor, turn and finish behaviour
//! - Restart back to an empty session

use rand::rngs::StdRng;
use rand::SeedableRng;
use songgame_common::config::GameConfig;
use songgame_common::events::EventBus;
use songgame_common::playback::NoopLauncher;
use songgame_common::{Error, GameHost, GameState};
use std::collections::HashMap;

const EMILY: &str = "\
Track URI,Track Name,Artist Name(s),Release Date
spotify:track:s1,S1,Art1,2020-01-01
spotify:track:s2,S2,Art1,2019-05-05
";

/// Test helper: host with no bundled dataset and a fixed seed
fn setup_host(seed: u64) -> GameHost {
    let config = GameConfig {
        default_dataset: "/nonexistent/songgame/filtered_list.csv".into(),
        ..GameConfig::default()
    };
    GameHost::with_rng(
        config,
        EventBus::new(64),
        Box::new(NoopLauncher),
        StdRng::seed_from_u64(seed),
    )
}

fn playlist(prefix: &str, songs: usize) -> String {
    let mut csv = String::from("Track URI,Track Name,Artist Name(s),Release Date\n");
    for i in 0..songs {
        csv.push_str(&format!(
            "spotify:track:{p}{i},{p} song {i},{p} artist,{year}-06-01\n",
            p = prefix,
            i = i,
            year = 1970 + i
        ));
    }
    csv
}

#[test]
fn test_emily_end_to_end() {
    let mut host = setup_host(1);

    let report = host.upload(EMILY.as_bytes(), "Emily", 2024).unwrap();
    assert_eq!(report.songs_added, 2);

    let rows = host.library().tracks();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|t| t.uploader == "Emily" && t.playlist_year == 2024));
    assert_eq!(rows[0].release_year, Some(2020));
    assert_eq!(rows[1].release_year, Some(2019));

    host.add_player("Emily").unwrap();
    host.start_game(Some(1)).unwrap();
    let snapshot = host.session().snapshot().to_vec();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].uploader, "Emily");

    let song = host.play_next().unwrap();
    assert_eq!(song.track, snapshot[0].name);
    assert_eq!(song.artist.as_deref(), Some("Art1"));
    assert_eq!(song.release_year, snapshot[0].release_year);
    assert_eq!(song.playlist_years, vec![2024]);
    assert_eq!(song.uploaders, vec!["Emily".to_string()]);
    assert_eq!(host.session().cursor(), 1);
    assert_eq!(host.session().state(), GameState::AllPlayed);

    host.add_points("Emily", 3).unwrap();
    let winners = host.finish().unwrap();
    assert_eq!(host.session().state(), GameState::Finished);
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].name, "Emily");
    assert_eq!(winners[0].score, 3);
}

#[test]
fn test_duplicate_upload_leaves_table_unchanged() {
    let mut host = setup_host(2);
    host.upload(EMILY.as_bytes(), "Emily", 2024).unwrap();

    for attempt in 0..3 {
        let err = host.upload(EMILY.as_bytes(), "Emily", 2024).unwrap_err();
        assert!(matches!(err, Error::DuplicateUpload), "attempt {}", attempt);
        assert_eq!(host.library().len(), 2);
    }
}

#[test]
fn test_draw_size_per_uploader() {
    let mut host = setup_host(3);
    host.upload(playlist("a", 8).as_bytes(), "Emily", 2024).unwrap();
    host.upload(playlist("b", 2).as_bytes(), "Noah", 2024).unwrap();
    host.upload(playlist("c", 5).as_bytes(), "Mia", 2023).unwrap();

    host.start_game(Some(5)).unwrap();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for track in host.session().snapshot() {
        *counts.entry(track.uploader.as_str()).or_insert(0) += 1;
    }
    assert_eq!(counts["Emily"], 5);
    assert_eq!(counts["Noah"], 2);
    assert_eq!(counts["Mia"], 5);
}

#[test]
fn test_turns_cycle_and_cursor_stops_at_end() {
    let mut host = setup_host(4);
    host.upload(playlist("a", 5).as_bytes(), "Emily", 2024).unwrap();
    for name in ["A", "B", "C"] {
        host.add_player(name).unwrap();
    }
    host.start_game(Some(5)).unwrap();

    let mut turns = Vec::new();
    for expected_cursor in 1..=5 {
        host.play_next().unwrap();
        assert_eq!(host.session().cursor(), expected_cursor);
        turns.push(host.session().turn());
    }
    assert_eq!(turns, vec![1, 2, 0, 1, 2]);

    let last = host.session().current_song().cloned();
    assert!(host.play_next().is_none());
    assert_eq!(host.session().cursor(), 5);
    assert_eq!(host.session().current_song().cloned(), last);
}

#[test]
fn test_tied_winners() {
    let mut host = setup_host(5);
    host.upload(playlist("a", 3).as_bytes(), "Emily", 2024).unwrap();
    for name in ["A", "B", "C"] {
        host.add_player(name).unwrap();
    }
    host.start_game(Some(3)).unwrap();
    while host.play_next().is_some() {}

    host.add_points("A", 5).unwrap();
    host.add_points("B", 5).unwrap();
    host.add_points("C", 3).unwrap();

    let names: Vec<String> = host.finish().unwrap().into_iter().map(|w| w.name).collect();
    assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
}

#[test]
fn test_restart_resets_session_but_keeps_uploads() {
    let mut host = setup_host(6);
    host.upload(playlist("a", 3).as_bytes(), "Emily", 2024).unwrap();
    host.add_player("A").unwrap();
    host.start_game(Some(3)).unwrap();
    host.play_next().unwrap();
    host.add_points("A", 4).unwrap();

    host.restart();

    let session = host.session();
    assert_eq!(session.state(), GameState::NotStarted);
    assert!(session.snapshot().is_empty());
    assert_eq!(session.cursor(), 0);
    assert!(session.players().is_empty());
    assert_eq!(host.library().len(), 3);

    // Players can join again
    host.add_player("B").unwrap();
    assert!(matches!(host.add_points("A", 1), Err(Error::UnknownPlayer(_))));
}

#[test]
fn test_same_song_across_uploaders_aggregated() {
    let mut host = setup_host(7);
    let shared = "Track URI,Track Name,Artist Name(s)\nspotify:track:x,Hit,Band\n";
    let shared_noah = "Track URI,Track Name,Artist Name(s)\nspotify:track:y,Hit,Band\n";
    host.upload(shared.as_bytes(), "Emily", 2022).unwrap();
    host.upload(shared_noah.as_bytes(), "Noah", 2020).unwrap();

    host.start_game(Some(1)).unwrap();
    let song = host.play_next().unwrap();
    assert_eq!(song.playlist_years, vec![2020, 2022]);
    assert_eq!(song.uploaders, vec!["Emily".to_string(), "Noah".to_string()]);
    assert_eq!(song.release_year_label(), "Unknown");
}
