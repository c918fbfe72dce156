use crate::{
    errors::ExpandError,
    info, success,
    types::Playlist,
    warning,
};

use super::{
    BATCH_SIZE, MAX_EXPAND_COUNT, ManualGenreProvider, MusicCatalog, PAGE_SIZE, SEED_WINDOW,
    fetch_recommendations, filter_new, paginate, select_seed,
};

/// Outcome of one `expand` invocation. The expander does not re-read the
/// playlist afterwards; callers that want to verify the final track count
/// re-query it themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionSummary {
    pub playlist_name: String,
    pub requested: u64,
    pub added: u64,
    pub duplicates_skipped: u64,
}

/// Orchestrates the full "expand playlist by N songs" operation against a
/// [`MusicCatalog`].
///
/// Holds nothing but a reference to the catalog client: every invocation
/// fetches its data fresh and keeps no state between runs.
pub struct Expander<'a, C: MusicCatalog> {
    catalog: &'a C,
}

impl<'a, C: MusicCatalog> Expander<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Expands the named playlist by `count` recommended songs.
    ///
    /// The count is split into batches of [`BATCH_SIZE`]: `count / 5` full
    /// batches plus a remainder batch when `count % 5` is nonzero. Every
    /// batch draws a fresh random seed, fetches its recommendations,
    /// filters out songs already in the playlist and submits the rest.
    /// Batches run sequentially and are not rolled back; if a later batch
    /// fails, the songs added so far stay in the playlist.
    ///
    /// # Errors
    ///
    /// - [`ExpandError::InvalidArgument`] for an empty name or a count
    ///   outside `1..=20`
    /// - [`ExpandError::PlaylistNotFound`] if no playlist matches the name
    ///   case-insensitively
    /// - [`ExpandError::InsufficientTracks`] if the playlist has fewer than
    ///   five tracks
    /// - [`ExpandError::GenreNotFound`] if seed selection gives up
    /// - [`ExpandError::Service`] for any catalog failure
    pub async fn expand(
        &self,
        playlist_name: &str,
        count: u64,
        provider: &mut impl ManualGenreProvider,
    ) -> Result<ExpansionSummary, ExpandError> {
        if playlist_name.trim().is_empty() {
            return Err(ExpandError::InvalidArgument(
                "playlist name must not be empty".into(),
            ));
        }
        if count == 0 || count > MAX_EXPAND_COUNT {
            return Err(ExpandError::InvalidArgument(format!(
                "count must be between 1 and {}, got {}",
                MAX_EXPAND_COUNT, count
            )));
        }

        let playlist = self.find_playlist(playlist_name).await?;
        if playlist.tracks.total < SEED_WINDOW {
            return Err(ExpandError::InsufficientTracks {
                have: playlist.tracks.total,
                need: SEED_WINDOW,
            });
        }

        let vocabulary = self.catalog.seed_genres().await?;

        let mut batch_sizes: Vec<u64> = vec![BATCH_SIZE; (count / BATCH_SIZE) as usize];
        if count % BATCH_SIZE != 0 {
            batch_sizes.push(count % BATCH_SIZE);
        }

        let mut added = 0u64;
        let mut duplicates_skipped = 0u64;

        for (i, batch_size) in batch_sizes.iter().enumerate() {
            info!(
                "Batch {}/{}: picking seeds from '{}'...",
                i + 1,
                batch_sizes.len(),
                playlist.name
            );

            let selection = select_seed(self.catalog, &playlist, &vocabulary, provider).await?;
            let seed = selection.into_recommendation_seed();

            let candidates = fetch_recommendations(self.catalog, &seed, *batch_size).await?;
            let uris: Vec<String> = candidates.into_iter().map(|t| t.uri).collect();

            let new_uris = filter_new(self.catalog, &uris, &playlist).await?;
            duplicates_skipped += (uris.len() - new_uris.len()) as u64;

            if new_uris.is_empty() {
                warning!("Batch {}: nothing new to add.", i + 1);
                continue;
            }

            for page in paginate(&new_uris, PAGE_SIZE) {
                self.catalog.add_tracks(&playlist.id, page).await?;
            }
            added += new_uris.len() as u64;
            success!("Batch {}: added {} song(s).", i + 1, new_uris.len());
        }

        Ok(ExpansionSummary {
            playlist_name: playlist.name,
            requested: count,
            added,
            duplicates_skipped,
        })
    }

    async fn find_playlist(&self, name: &str) -> Result<Playlist, ExpandError> {
        let playlists = self.catalog.user_playlists().await?;
        playlists
            .into_iter()
            .find(|p| p.name.to_lowercase() == name.to_lowercase())
            .ok_or_else(|| ExpandError::PlaylistNotFound(name.to_string()))
    }
}
