//! # Expander Module
//!
//! The recommendation-sampling and deduplication core. Everything in here is
//! written against the [`MusicCatalog`] capability so that the workflow can
//! be exercised without a network connection or interactive input.
//!
//! ## Workflow
//!
//! ```text
//! expand(playlist_name, count)
//!     ├── resolve playlist (case-insensitive name match)
//!     ├── per batch of ≤5 songs:
//!     │     ├── seed selection (random window + bounded retry)
//!     │     ├── recommendation fetch (≤20 per endpoint call)
//!     │     ├── duplicate filter (full playlist read, page size 100)
//!     │     └── add tracks
//!     └── summary
//! ```
//!
//! Batches run strictly sequentially and there is no rollback: if a later
//! batch fails, songs added by earlier batches stay in the playlist.

mod dedup;
mod expand;
mod paginate;
mod recommend;
mod resolver;
mod seed;

pub use dedup::filter_new;
pub use expand::{ExpansionSummary, Expander};
pub use paginate::paginate;
pub use recommend::fetch_recommendations;
pub use resolver::{SeedMaterial, resolve_seed_material};
pub use seed::{ManualGenreProvider, SeedSelection, select_seed};

use std::collections::HashSet;

use crate::errors::ServiceError;
use crate::types::{Playlist, Track};

/// Page size for playlist reads and batched track submissions.
pub const PAGE_SIZE: usize = 100;

/// Number of tracks sampled as seed material per attempt.
pub const SEED_WINDOW: u64 = 5;

/// Sampling attempts before the manual genre fallback kicks in.
pub const RETRY_MAX: u32 = 8;

/// Upper bound for a single recommendation fetch, pool-wide.
pub const RECOMMENDATIONS_MAX_LIMIT: u64 = 50;

/// The recommendation endpoint caps a single call at this many results.
pub const RECOMMENDATION_CALL_LIMIT: u64 = 20;

/// The recommendation endpoint accepts at most this many seeds in total,
/// across tracks, artists and genres combined.
pub const SEED_LIMIT: usize = 5;

/// Songs added to the playlist per expansion sub-step.
pub const BATCH_SIZE: u64 = 5;

/// Largest accepted `count` for a single expand invocation.
pub const MAX_EXPAND_COUNT: u64 = 20;

/// Seed values for one recommendation query. Any combination of the three
/// kinds may be present; the endpoint accepts up to five seeds in total.
#[derive(Debug, Clone, Default)]
pub struct RecommendationSeed {
    pub tracks: Vec<String>,
    pub artists: Vec<String>,
    pub genres: Vec<String>,
}

/// Read/write access to the music catalog and playlist store.
///
/// The production implementation is [`crate::spotify::SpotifyClient`]; tests
/// substitute an in-memory catalog. The client is constructed once and
/// passed by reference into the expander, never held as global state.
pub trait MusicCatalog {
    /// Lists the playlists of the configured user.
    async fn user_playlists(&self) -> Result<Vec<Playlist>, ServiceError>;

    /// Reads one page of a playlist, skipping removed/local entries.
    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Track>, ServiceError>;

    /// Fetches full track objects (with artist ids) for the given track ids.
    async fn track_details(&self, track_ids: &[String]) -> Result<Vec<Track>, ServiceError>;

    /// Returns the genre tags of a single artist.
    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>, ServiceError>;

    /// Returns the vocabulary of genres accepted as recommendation seeds.
    async fn seed_genres(&self) -> Result<HashSet<String>, ServiceError>;

    /// Queries the recommendation endpoint once with the given seeds.
    async fn recommendations(
        &self,
        seed: &RecommendationSeed,
        limit: u64,
    ) -> Result<Vec<Track>, ServiceError>;

    /// Appends tracks to a playlist. Irreversible.
    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), ServiceError>;
}
