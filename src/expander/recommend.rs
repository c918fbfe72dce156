use crate::{errors::ServiceError, types::Track};

use super::{MusicCatalog, RECOMMENDATION_CALL_LIMIT, RECOMMENDATIONS_MAX_LIMIT, RecommendationSeed};

/// Accumulates a recommendation pool of at least `requested` candidates and
/// truncates it to exactly that many (fewer only if the endpoint itself
/// returns less).
///
/// `requested` is clamped to `[0, RECOMMENDATIONS_MAX_LIMIT]`. The endpoint
/// caps a single call at [`RECOMMENDATION_CALL_LIMIT`] results, so
/// `ceil(requested / 20)` calls of limit 20 are issued, every one with the
/// same seed set. Repeating the seeds can return overlapping candidates;
/// that is the known behavior of the source tool and the duplicate filter
/// downstream deals with it.
///
/// `requested == 0` returns an empty pool without touching the endpoint.
pub async fn fetch_recommendations<C: MusicCatalog>(
    catalog: &C,
    seed: &RecommendationSeed,
    requested: u64,
) -> Result<Vec<Track>, ServiceError> {
    let requested = requested.min(RECOMMENDATIONS_MAX_LIMIT);
    if requested == 0 {
        return Ok(Vec::new());
    }

    let calls = requested.div_ceil(RECOMMENDATION_CALL_LIMIT);
    let mut pool: Vec<Track> = Vec::new();

    for _ in 0..calls {
        let tracks = catalog
            .recommendations(seed, RECOMMENDATION_CALL_LIMIT)
            .await?;
        pool.extend(tracks);
    }

    pool.truncate(requested as usize);
    Ok(pool)
}
