use std::collections::HashSet;

use rand::Rng;

use crate::{errors::ExpandError, info, types::Playlist, warning};

use super::{
    MusicCatalog, RETRY_MAX, RecommendationSeed, SEED_LIMIT, SEED_WINDOW, resolve_seed_material,
};

/// Seed values picked for one recommendation batch: the sampled window's
/// track ids, the first resolved seed artist and a genre from the platform
/// vocabulary.
#[derive(Debug, Clone)]
pub struct SeedSelection {
    pub track_ids: Vec<String>,
    pub artist_id: Option<String>,
    pub genre: String,
}

impl SeedSelection {
    /// Turns the selection into query seeds, keeping the combined seed
    /// count within [`SEED_LIMIT`]: the genre and the artist always go in,
    /// sampled track ids fill the remaining slots.
    pub fn into_recommendation_seed(mut self) -> RecommendationSeed {
        let artists: Vec<String> = self.artist_id.into_iter().collect();
        let genres = vec![self.genre];
        self.track_ids
            .truncate(SEED_LIMIT - artists.len() - genres.len());

        RecommendationSeed {
            tracks: self.track_ids,
            artists,
            genres,
        }
    }
}

/// Last-resort genre source once automatic sampling is exhausted.
///
/// The CLI implements this with interactive prompts; tests use scripted
/// providers. Keeping it behind a trait keeps the selection loop itself
/// free of terminal I/O.
pub trait ManualGenreProvider {
    /// Asks for a genre. `None` means the user gave no usable answer.
    fn request_genre(&mut self) -> Option<String>;

    /// After an out-of-vocabulary answer: try once more, or give up?
    fn confirm_retry(&mut self) -> bool;
}

enum SeedState {
    Sampling(u32),
    ManualFallback,
    Accepted(SeedSelection),
    Aborted,
}

/// Samples random windows of the playlist until a usable seed genre is
/// found, falling back to the manual genre provider after [`RETRY_MAX`]
/// attempts.
///
/// Every attempt draws a fresh offset in `[0, total - window)` (offset 0
/// when the playlist is exactly window-sized), reads the window and runs
/// the genre resolver on it. The returned genre is always an element of
/// `vocabulary`.
///
/// # Errors
///
/// - [`ExpandError::InsufficientTracks`] if the playlist is shorter than
///   the sampling window
/// - [`ExpandError::GenreNotFound`] if the retry budget is exhausted and
///   the manual fallback is declined
pub async fn select_seed<C: MusicCatalog>(
    catalog: &C,
    playlist: &Playlist,
    vocabulary: &HashSet<String>,
    provider: &mut impl ManualGenreProvider,
) -> Result<SeedSelection, ExpandError> {
    let total = playlist.tracks.total;
    if total < SEED_WINDOW {
        return Err(ExpandError::InsufficientTracks {
            have: total,
            need: SEED_WINDOW,
        });
    }

    let mut last_window: Vec<String> = Vec::new();
    let mut last_artist: Option<String> = None;
    let mut state = SeedState::Sampling(0);

    loop {
        state = match state {
            SeedState::Sampling(attempt) if attempt >= RETRY_MAX => SeedState::ManualFallback,
            SeedState::Sampling(attempt) => {
                let offset = if total > SEED_WINDOW {
                    rand::rng().random_range(0..total - SEED_WINDOW)
                } else {
                    0
                };

                let window = catalog
                    .playlist_tracks(&playlist.id, offset, SEED_WINDOW)
                    .await?;
                last_window = window.iter().map(|t| t.id.clone()).collect();

                let material = resolve_seed_material(catalog, &last_window, vocabulary).await?;
                last_artist = material.artist_ids.first().cloned();

                match material.genres.into_iter().next() {
                    Some(genre) => SeedState::Accepted(SeedSelection {
                        track_ids: last_window.clone(),
                        artist_id: last_artist.clone(),
                        genre,
                    }),
                    None => SeedState::Sampling(attempt + 1),
                }
            }
            SeedState::ManualFallback => {
                info!(
                    "No seed genre found after {} sampling attempts, asking for one.",
                    RETRY_MAX
                );
                match provider.request_genre() {
                    Some(genre) if vocabulary.contains(&genre) => {
                        SeedState::Accepted(SeedSelection {
                            track_ids: last_window.clone(),
                            artist_id: last_artist.clone(),
                            genre,
                        })
                    }
                    answer => {
                        if let Some(genre) = answer {
                            warning!("'{}' is not an available seed genre.", genre);
                        }
                        if provider.confirm_retry() {
                            SeedState::ManualFallback
                        } else {
                            SeedState::Aborted
                        }
                    }
                }
            }
            SeedState::Accepted(selection) => return Ok(selection),
            SeedState::Aborted => return Err(ExpandError::GenreNotFound(RETRY_MAX)),
        };
    }
}
