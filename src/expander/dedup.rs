use std::collections::HashSet;

use crate::{errors::ServiceError, types::Playlist, warning};

use super::{MusicCatalog, PAGE_SIZE};

/// Drops every candidate URI that is already in the target playlist.
///
/// Reads the playlist's current contents page by page (page size 100) until
/// the catalog runs out of pages, builds a membership set of track URIs and
/// returns the candidates that are not in it, in their original order. The
/// read deliberately ignores the track total cached on `playlist`: earlier
/// batches of the same run may have grown the playlist past that snapshot.
/// Rejected duplicates are reported to the user but are not an error;
/// applying the filter to its own output against the same playlist contents
/// returns the identical sequence.
pub async fn filter_new<C: MusicCatalog>(
    catalog: &C,
    candidate_uris: &[String],
    playlist: &Playlist,
) -> Result<Vec<String>, ServiceError> {
    let mut existing: HashSet<String> = HashSet::new();
    let mut offset = 0u64;
    loop {
        let page = catalog
            .playlist_tracks(&playlist.id, offset, PAGE_SIZE as u64)
            .await?;
        if page.is_empty() {
            break;
        }
        existing.extend(page.into_iter().map(|t| t.uri));
        offset += PAGE_SIZE as u64;
    }

    let mut new_uris = Vec::with_capacity(candidate_uris.len());
    for uri in candidate_uris {
        if existing.contains(uri) {
            warning!("Skipping {}: already in playlist '{}'.", uri, playlist.name);
        } else {
            new_uris.push(uri.clone());
        }
    }

    Ok(new_uris)
}
