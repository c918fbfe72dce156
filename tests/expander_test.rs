use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use morphomatic::errors::{ExpandError, ServiceError};
use morphomatic::expander::{
    Expander, ManualGenreProvider, MusicCatalog, RecommendationSeed, SeedSelection,
    fetch_recommendations, filter_new, resolve_seed_material, select_seed,
};
use morphomatic::types::{Playlist, Track, TrackArtist, TrackCount};

// Helper function to create a playlist track with a single artist
fn track(id: &str, artist_id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Track {}", id),
        uri: format!("spotify:track:{}", id),
        artists: vec![TrackArtist {
            id: artist_id.to_string(),
            name: format!("Artist {}", artist_id),
        }],
    }
}

/// In-memory stand-in for the Spotify catalog. Holds a single playlist and
/// records every recommendation call and every submitted batch.
struct MockCatalog {
    playlist: Playlist,
    tracks: Mutex<Vec<Track>>,
    genres_by_artist: HashMap<String, Vec<String>>,
    vocabulary: HashSet<String>,
    /// When set, the first candidate of every recommendation call is a song
    /// that is already in the playlist.
    duplicate_first: bool,
    /// When set, every recommendation call returns the same candidates, the
    /// way identical seeds tend to on the real endpoint.
    repeat_recommendations: bool,
    recommendation_limits: Mutex<Vec<u64>>,
    recommendation_seed_sizes: Mutex<Vec<usize>>,
    added_batches: Mutex<Vec<Vec<String>>>,
}

impl MockCatalog {
    fn new(playlist_name: &str, track_count: usize, genre: &str) -> Self {
        let tracks: Vec<Track> = (0..track_count)
            .map(|i| track(&format!("t{}", i), &format!("a{}", i)))
            .collect();
        let genres_by_artist = (0..track_count)
            .map(|i| (format!("a{}", i), vec![genre.to_string()]))
            .collect();

        MockCatalog {
            playlist: Playlist {
                id: "pl1".to_string(),
                name: playlist_name.to_string(),
                tracks: TrackCount {
                    total: track_count as u64,
                },
            },
            tracks: Mutex::new(tracks),
            genres_by_artist,
            vocabulary: HashSet::from(["rock".to_string(), "jazz".to_string()]),
            duplicate_first: false,
            repeat_recommendations: false,
            recommendation_limits: Mutex::new(Vec::new()),
            recommendation_seed_sizes: Mutex::new(Vec::new()),
            added_batches: Mutex::new(Vec::new()),
        }
    }

    fn recommendation_calls(&self) -> Vec<u64> {
        self.recommendation_limits.lock().unwrap().clone()
    }

    fn recommendation_seed_sizes(&self) -> Vec<usize> {
        self.recommendation_seed_sizes.lock().unwrap().clone()
    }

    fn added_batches(&self) -> Vec<Vec<String>> {
        self.added_batches.lock().unwrap().clone()
    }
}

impl MusicCatalog for MockCatalog {
    async fn user_playlists(&self) -> Result<Vec<Playlist>, ServiceError> {
        Ok(vec![self.playlist.clone()])
    }

    async fn playlist_tracks(
        &self,
        _playlist_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Track>, ServiceError> {
        let tracks = self.tracks.lock().unwrap();
        let start = (offset as usize).min(tracks.len());
        let end = (start + limit as usize).min(tracks.len());
        Ok(tracks[start..end].to_vec())
    }

    async fn track_details(&self, track_ids: &[String]) -> Result<Vec<Track>, ServiceError> {
        let tracks = self.tracks.lock().unwrap();
        Ok(track_ids
            .iter()
            .filter_map(|id| tracks.iter().find(|t| &t.id == id).cloned())
            .collect())
    }

    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .genres_by_artist
            .get(artist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn seed_genres(&self) -> Result<HashSet<String>, ServiceError> {
        Ok(self.vocabulary.clone())
    }

    async fn recommendations(
        &self,
        seed: &RecommendationSeed,
        limit: u64,
    ) -> Result<Vec<Track>, ServiceError> {
        self.recommendation_seed_sizes
            .lock()
            .unwrap()
            .push(seed.tracks.len() + seed.artists.len() + seed.genres.len());

        let mut limits = self.recommendation_limits.lock().unwrap();
        limits.push(limit);
        let call = if self.repeat_recommendations {
            1
        } else {
            limits.len()
        };

        let mut recs = Vec::new();
        if self.duplicate_first {
            let tracks = self.tracks.lock().unwrap();
            recs.push(tracks[0].clone());
        }
        let mut i = 0;
        while recs.len() < limit as usize {
            recs.push(track(&format!("rec{}_{}", call, i), "seed-artist"));
            i += 1;
        }
        Ok(recs)
    }

    async fn add_tracks(&self, _playlist_id: &str, uris: &[String]) -> Result<(), ServiceError> {
        self.added_batches.lock().unwrap().push(uris.to_vec());

        // Keep the playlist contents honest so subsequent duplicate-filter
        // reads see what was just added.
        let mut tracks = self.tracks.lock().unwrap();
        for uri in uris {
            let id = uri.strip_prefix("spotify:track:").unwrap_or(uri);
            tracks.push(track(id, "added-artist"));
        }
        Ok(())
    }
}

/// Provider for tests where the fallback must never fire.
struct NoFallback;

impl ManualGenreProvider for NoFallback {
    fn request_genre(&mut self) -> Option<String> {
        panic!("manual fallback should not be invoked");
    }

    fn confirm_retry(&mut self) -> bool {
        false
    }
}

/// Provider that answers with a fixed genre and counts its invocations.
struct ScriptedProvider {
    answer: Option<String>,
    genre_requests: u32,
    retry: bool,
}

impl ScriptedProvider {
    fn answering(genre: &str) -> Self {
        ScriptedProvider {
            answer: Some(genre.to_string()),
            genre_requests: 0,
            retry: false,
        }
    }
}

impl ManualGenreProvider for ScriptedProvider {
    fn request_genre(&mut self) -> Option<String> {
        self.genre_requests += 1;
        self.answer.clone()
    }

    fn confirm_retry(&mut self) -> bool {
        self.retry
    }
}

#[tokio::test]
async fn test_resolver_filters_genres_to_vocabulary() {
    let mut catalog = MockCatalog::new("Road Trip", 3, "rock");
    catalog
        .genres_by_artist
        .insert("a1".to_string(), vec!["obscure-subgenre".to_string()]);

    let vocabulary = catalog.seed_genres().await.unwrap();
    let ids: Vec<String> = vec!["t0".into(), "t1".into(), "t2".into()];
    let material = resolve_seed_material(&catalog, &ids, &vocabulary)
        .await
        .unwrap();

    // Primary artists are collected in input order
    assert_eq!(material.artist_ids, vec!["a0", "a1", "a2"]);

    // a1's genre is not in the vocabulary and must be dropped
    assert_eq!(material.genres, vec!["rock", "rock"]);
}

#[tokio::test]
async fn test_resolver_may_return_empty_genres() {
    let catalog = MockCatalog::new("Road Trip", 3, "water-tower-music");

    let vocabulary = catalog.seed_genres().await.unwrap();
    let ids: Vec<String> = vec!["t0".into(), "t1".into()];
    let material = resolve_seed_material(&catalog, &ids, &vocabulary)
        .await
        .unwrap();

    // Raw genres existed, but none survives the vocabulary filter
    assert_eq!(material.artist_ids.len(), 2);
    assert!(material.genres.is_empty());
}

#[tokio::test]
async fn test_fetch_zero_requested_issues_no_calls() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");
    let seed = RecommendationSeed::default();

    let pool = fetch_recommendations(&catalog, &seed, 0).await.unwrap();

    assert!(pool.is_empty());
    assert!(catalog.recommendation_calls().is_empty());
}

#[tokio::test]
async fn test_fetch_seven_issues_one_call_of_twenty() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");
    let seed = RecommendationSeed::default();

    let pool = fetch_recommendations(&catalog, &seed, 7).await.unwrap();

    // One endpoint call at the per-call cap, truncated to the request
    assert_eq!(catalog.recommendation_calls(), vec![20]);
    assert_eq!(pool.len(), 7);
}

#[tokio::test]
async fn test_fetch_clamps_oversized_requests() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");
    let seed = RecommendationSeed::default();

    let pool = fetch_recommendations(&catalog, &seed, 100).await.unwrap();

    // Clamped to 50, which takes ceil(50/20) = 3 calls
    assert_eq!(catalog.recommendation_calls(), vec![20, 20, 20]);
    assert_eq!(pool.len(), 50);
}

#[tokio::test]
async fn test_filter_new_drops_known_tracks_and_keeps_order() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");

    let candidates = vec![
        "spotify:track:fresh1".to_string(),
        "spotify:track:t3".to_string(), // already in the playlist
        "spotify:track:fresh2".to_string(),
    ];
    let new_uris = filter_new(&catalog, &candidates, &catalog.playlist)
        .await
        .unwrap();

    assert_eq!(new_uris, vec!["spotify:track:fresh1", "spotify:track:fresh2"]);

    // Idempotent: filtering the output again changes nothing
    let again = filter_new(&catalog, &new_uris, &catalog.playlist)
        .await
        .unwrap();
    assert_eq!(again, new_uris);
}

#[tokio::test]
async fn test_select_seed_returns_vocabulary_genre() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");
    let vocabulary = catalog.seed_genres().await.unwrap();

    let selection = select_seed(&catalog, &catalog.playlist, &vocabulary, &mut NoFallback)
        .await
        .unwrap();

    assert!(vocabulary.contains(&selection.genre));
    assert_eq!(selection.track_ids.len(), 5);
    assert!(selection.artist_id.is_some());
}

#[test]
fn test_seed_selection_trims_to_endpoint_seed_cap() {
    let selection = SeedSelection {
        track_ids: (0..5).map(|i| format!("t{}", i)).collect(),
        artist_id: Some("a0".to_string()),
        genre: "rock".to_string(),
    };
    let seed = selection.into_recommendation_seed();

    // Genre and artist always make the cut, track ids fill the rest
    assert_eq!(seed.tracks, vec!["t0", "t1", "t2"]);
    assert_eq!(seed.artists, vec!["a0"]);
    assert_eq!(seed.genres, vec!["rock"]);
    assert_eq!(seed.tracks.len() + seed.artists.len() + seed.genres.len(), 5);

    // Without an artist, one more track id fits
    let selection = SeedSelection {
        track_ids: (0..5).map(|i| format!("t{}", i)).collect(),
        artist_id: None,
        genre: "rock".to_string(),
    };
    let seed = selection.into_recommendation_seed();
    assert_eq!(seed.tracks.len(), 4);
    assert!(seed.artists.is_empty());
}

#[tokio::test]
async fn test_select_seed_insufficient_tracks() {
    let catalog = MockCatalog::new("Road Trip", 2, "rock");
    let vocabulary = catalog.seed_genres().await.unwrap();

    let result = select_seed(&catalog, &catalog.playlist, &vocabulary, &mut NoFallback).await;

    assert!(matches!(
        result,
        Err(ExpandError::InsufficientTracks { have: 2, need: 5 })
    ));
}

#[tokio::test]
async fn test_select_seed_falls_back_once_after_exhausted_retries() {
    // No sampled genre ever passes the vocabulary filter
    let catalog = MockCatalog::new("Road Trip", 10, "nonexistent-genre");
    let vocabulary = catalog.seed_genres().await.unwrap();
    let mut provider = ScriptedProvider::answering("jazz");

    let selection = select_seed(&catalog, &catalog.playlist, &vocabulary, &mut provider)
        .await
        .unwrap();

    assert_eq!(provider.genre_requests, 1);
    assert_eq!(selection.genre, "jazz");
}

#[tokio::test]
async fn test_select_seed_aborts_when_fallback_declined() {
    let catalog = MockCatalog::new("Road Trip", 10, "nonexistent-genre");
    let vocabulary = catalog.seed_genres().await.unwrap();

    // The manual answer is not in the vocabulary and no retry is wanted
    let mut provider = ScriptedProvider::answering("vaporcore");
    let result = select_seed(&catalog, &catalog.playlist, &vocabulary, &mut provider).await;

    assert!(matches!(result, Err(ExpandError::GenreNotFound(8))));
}

#[tokio::test]
async fn test_expand_rejects_bad_arguments() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");
    let expander = Expander::new(&catalog);

    let result = expander.expand("", 5, &mut NoFallback).await;
    assert!(matches!(result, Err(ExpandError::InvalidArgument(_))));

    let result = expander.expand("Road Trip", 0, &mut NoFallback).await;
    assert!(matches!(result, Err(ExpandError::InvalidArgument(_))));

    let result = expander.expand("Road Trip", 21, &mut NoFallback).await;
    assert!(matches!(result, Err(ExpandError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_expand_unknown_playlist() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");
    let expander = Expander::new(&catalog);

    let result = expander.expand("Beach Day", 5, &mut NoFallback).await;

    assert!(matches!(result, Err(ExpandError::PlaylistNotFound(_))));
}

#[tokio::test]
async fn test_expand_insufficient_tracks() {
    let catalog = MockCatalog::new("Road Trip", 2, "rock");
    let expander = Expander::new(&catalog);

    let result = expander.expand("Road Trip", 5, &mut NoFallback).await;

    assert!(matches!(
        result,
        Err(ExpandError::InsufficientTracks { have: 2, need: 5 })
    ));
}

#[tokio::test]
async fn test_expand_matches_playlist_name_case_insensitively() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");
    let expander = Expander::new(&catalog);

    let summary = expander
        .expand("rOaD tRiP", 5, &mut NoFallback)
        .await
        .unwrap();

    assert_eq!(summary.playlist_name, "Road Trip");
    assert_eq!(summary.added, 5);
}

#[tokio::test]
async fn test_expand_seven_runs_two_batches() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");
    let expander = Expander::new(&catalog);

    let summary = expander
        .expand("Road Trip", 7, &mut NoFallback)
        .await
        .unwrap();

    // One full batch of 5 plus a remainder batch of 2, one endpoint call each
    assert_eq!(catalog.recommendation_calls(), vec![20, 20]);

    let batches = catalog.added_batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 5);
    assert_eq!(batches[1].len(), 2);

    // Nothing that was already in the playlist got re-added
    for uri in batches.iter().flatten() {
        assert!(!uri.starts_with("spotify:track:t"), "re-added {}", uri);
    }

    assert_eq!(summary.requested, 7);
    assert_eq!(summary.added, 7);
    assert_eq!(summary.duplicates_skipped, 0);
}

#[tokio::test]
async fn test_expand_keeps_every_recommendation_call_within_seed_cap() {
    let catalog = MockCatalog::new("Road Trip", 10, "rock");
    let expander = Expander::new(&catalog);

    expander
        .expand("Road Trip", 7, &mut NoFallback)
        .await
        .unwrap();

    // The endpoint rejects more than five combined seeds per call
    let sizes = catalog.recommendation_seed_sizes();
    assert_eq!(sizes.len(), 2);
    for size in sizes {
        assert!(size <= 5, "recommendation call carried {} seeds", size);
    }
}

#[tokio::test]
async fn test_expand_filters_earlier_additions_across_page_boundary() {
    // 98 tracks: the first batch's additions land on the second page, past
    // the track total the playlist listing reported at the start of the run.
    let mut catalog = MockCatalog::new("Road Trip", 98, "rock");
    catalog.repeat_recommendations = true;
    let expander = Expander::new(&catalog);

    let summary = expander
        .expand("Road Trip", 10, &mut NoFallback)
        .await
        .unwrap();

    // The second batch gets the same candidates and must drop all of them
    assert_eq!(summary.added, 5);
    assert_eq!(summary.duplicates_skipped, 5);
    assert_eq!(catalog.added_batches().len(), 1);
}

#[tokio::test]
async fn test_expand_skips_recommendations_already_in_playlist() {
    let mut catalog = MockCatalog::new("Road Trip", 10, "rock");
    catalog.duplicate_first = true;
    let expander = Expander::new(&catalog);

    let summary = expander
        .expand("Road Trip", 5, &mut NoFallback)
        .await
        .unwrap();

    // The duplicate candidate is reported and dropped, not an error
    assert_eq!(summary.added, 4);
    assert_eq!(summary.duplicates_skipped, 1);

    let batches = catalog.added_batches();
    assert_eq!(batches.len(), 1);
    assert!(!batches[0].contains(&"spotify:track:t0".to_string()));
}
