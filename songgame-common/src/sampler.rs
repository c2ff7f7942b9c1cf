//! Per-uploader sampling and play-order shuffle

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::track::Track;

/// Draw the play order for a new game
///
/// Each uploader contributes a uniform sample without replacement of
/// `min(per_player, uploaded)` rows. The combined sample is then shuffled
/// once more, so the order is not grouped by uploader.
pub fn draw_snapshot<R: Rng + ?Sized>(tracks: &[Track], per_player: usize, rng: &mut R) -> Vec<Track> {
    let mut groups: BTreeMap<&str, Vec<&Track>> = BTreeMap::new();
    for track in tracks {
        groups.entry(track.uploader.as_str()).or_default().push(track);
    }

    let mut selected: Vec<Track> = Vec::new();
    for (uploader, group) in &groups {
        let take = per_player.min(group.len());
        tracing::debug!(uploader = %uploader, available = group.len(), take, "Sampling uploader");
        selected.extend(group.choose_multiple(rng, take).map(|t| (*t).clone()));
    }

    selected.shuffle(rng);
    selected
}

/// Synthetic "previous release year" shown before the first song
///
/// Uniform in `[min, max]` of the known release years across all `tracks`;
/// `None` when no track has a release year.
pub fn seed_previous_year<R: Rng + ?Sized>(tracks: &[Track], rng: &mut R) -> Option<i32> {
    let mut years = tracks.iter().filter_map(|t| t.release_year);
    let first = years.next()?;
    let (min, max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    Some(rng.gen_range(min..=max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::sample_track;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn library(counts: &[(&str, usize)]) -> Vec<Track> {
        counts
            .iter()
            .flat_map(|(uploader, n)| {
                (0..*n).map(move |i| sample_track(&format!("{}-{}", uploader, i), "Artist", uploader))
            })
            .collect()
    }

    fn per_uploader(snapshot: &[Track]) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for track in snapshot {
            *counts.entry(track.uploader.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_sample_size_is_min_of_requested_and_available() {
        let tracks = library(&[("Emily", 12), ("Noah", 3), ("Mia", 5)]);
        let mut rng = StdRng::seed_from_u64(7);

        let snapshot = draw_snapshot(&tracks, 5, &mut rng);
        let counts = per_uploader(&snapshot);

        assert_eq!(snapshot.len(), 13);
        assert_eq!(counts["Emily"], 5);
        assert_eq!(counts["Noah"], 3);
        assert_eq!(counts["Mia"], 5);
    }

    #[test]
    fn test_sample_without_replacement() {
        let tracks = library(&[("Emily", 10)]);
        let mut rng = StdRng::seed_from_u64(11);

        let snapshot = draw_snapshot(&tracks, 10, &mut rng);
        let mut names: Vec<_> = snapshot.iter().filter_map(|t| t.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_snapshot_is_permutation_of_samples() {
        let tracks = library(&[("Emily", 4), ("Noah", 4)]);
        let mut rng = StdRng::seed_from_u64(3);

        let snapshot = draw_snapshot(&tracks, 4, &mut rng);
        let mut got: Vec<_> = snapshot.iter().filter_map(|t| t.name.clone()).collect();
        let mut expected: Vec<_> = tracks.iter().filter_map(|t| t.name.clone()).collect();
        got.sort();
        expected.sort();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_snapshot_not_grouped_by_uploader() {
        // Across many draws the order must mix uploaders: count how often
        // neighbours share an uploader. Fully grouped output would give 18/20
        // adjacent pairs; chance is about 9.5/20.
        let tracks = library(&[("Emily", 10), ("Noah", 10), ("Mia", 0)]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut same = 0usize;
        let mut pairs = 0usize;
        for _ in 0..200 {
            let snapshot = draw_snapshot(&tracks, 10, &mut rng);
            for pair in snapshot.windows(2) {
                pairs += 1;
                if pair[0].uploader == pair[1].uploader {
                    same += 1;
                }
            }
        }
        let ratio = same as f64 / pairs as f64;
        assert!(ratio < 0.6, "adjacency ratio too high: {}", ratio);
    }

    #[test]
    fn test_empty_library_gives_empty_snapshot() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(draw_snapshot(&[], 10, &mut rng).is_empty());
    }

    #[test]
    fn test_seed_previous_year_within_range() {
        let mut tracks = library(&[("Emily", 3)]);
        tracks[0].release_year = Some(1980);
        tracks[2].release_year = Some(1995);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..50 {
            let year = seed_previous_year(&tracks, &mut rng).unwrap();
            assert!((1980..=1995).contains(&year));
        }
    }

    #[test]
    fn test_seed_previous_year_none_without_years() {
        let tracks = library(&[("Emily", 3)]);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(seed_previous_year(&tracks, &mut rng), None);
    }
}
