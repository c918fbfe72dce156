use std::collections::HashSet;

use crate::errors::ServiceError;

use super::MusicCatalog;

/// Seed material derived from a window of sampled tracks: the primary
/// artist of each track plus the subset of their genres that the platform
/// accepts as recommendation seeds.
#[derive(Debug, Clone, Default)]
pub struct SeedMaterial {
    pub artist_ids: Vec<String>,
    pub genres: Vec<String>,
}

/// Resolves sampled track ids into seed artists and usable seed genres.
///
/// For every track the first-listed artist is taken as the primary one, and
/// for every primary artist the first reported genre (if any) is collected.
/// The collected genres are then filtered against `vocabulary`; the result
/// may be empty even when the artists carried raw genre tags.
pub async fn resolve_seed_material<C: MusicCatalog>(
    catalog: &C,
    track_ids: &[String],
    vocabulary: &HashSet<String>,
) -> Result<SeedMaterial, ServiceError> {
    if track_ids.is_empty() {
        return Ok(SeedMaterial::default());
    }

    let tracks = catalog.track_details(track_ids).await?;

    let mut artist_ids = Vec::new();
    let mut raw_genres = Vec::new();
    for track in &tracks {
        let Some(primary) = track.artists.first() else {
            continue;
        };
        artist_ids.push(primary.id.clone());

        let genres = catalog.artist_genres(&primary.id).await?;
        if let Some(first) = genres.into_iter().next() {
            raw_genres.push(first);
        }
    }

    let genres = raw_genres
        .into_iter()
        .filter(|g| vocabulary.contains(g))
        .collect();

    Ok(SeedMaterial { artist_ids, genres })
}
