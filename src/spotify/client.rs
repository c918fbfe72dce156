use std::{collections::HashSet, time::Duration};

use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{sync::Mutex, time::sleep};

use crate::{
    config,
    errors::ServiceError,
    expander::{MusicCatalog, RecommendationSeed, paginate},
    management::TokenManager,
    types::{
        AddTracksToPlaylistRequest, AddTracksToPlaylistResponse, Artist, GenreSeedsResponse,
        GetSeveralTracksResponse, GetUserPlaylistsResponse, PlaylistItemsResponse,
        RecommendationsResponse, Playlist, Track,
    },
    warning,
};

/// Page size when listing the user's playlists.
const PLAYLISTS_PAGE_LIMIT: u64 = 50;

/// Maximum number of ids accepted by `GET /tracks` in one call.
const TRACKS_LOOKUP_LIMIT: usize = 50;

/// Authenticated Spotify Web API client.
///
/// Constructed once at startup from a persisted token and passed by
/// reference into the expander. Token refresh happens transparently before
/// every request.
pub struct SpotifyClient {
    http: Client,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            tokens: Mutex::new(tokens),
        }
    }

    async fn bearer(&self) -> String {
        self.tokens.lock().await.get_valid_token().await
    }

    /// GET with the house retry rules: honor `Retry-After` on 429 (up to
    /// 120 seconds), wait out 502s, propagate the rest.
    async fn get_json<T: DeserializeOwned>(&self, api_url: &str) -> Result<T, ServiceError> {
        loop {
            let token = self.bearer().await;
            let response = self.http.get(api_url).bearer_auth(token).send().await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(0);
                if retry_after <= 120 {
                    sleep(Duration::from_secs(retry_after)).await;
                    continue;
                }
                warning!(
                    "Retry after has reached an abnormal high of {} seconds.",
                    retry_after
                );
                return Err(ServiceError::UnexpectedResponse(format!(
                    "rate limited for {} seconds",
                    retry_after
                )));
            }

            match response.error_for_status() {
                Ok(valid_response) => {
                    return Ok(valid_response.json::<T>().await?);
                }
                Err(err) => {
                    if let Some(status) = err.status() {
                        if status == StatusCode::BAD_GATEWAY {
                            sleep(Duration::from_secs(10)).await;
                            continue; // retry
                        }
                    }
                    return Err(ServiceError::Http(err)); // propagate other errors
                }
            }
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        api_url: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        loop {
            let token = self.bearer().await;
            let response = self
                .http
                .post(api_url)
                .bearer_auth(token)
                .json(body)
                .send()
                .await?;

            match response.error_for_status() {
                Ok(valid_response) => {
                    return Ok(valid_response.json::<T>().await?);
                }
                Err(err) => {
                    if let Some(status) = err.status() {
                        if status == StatusCode::BAD_GATEWAY {
                            sleep(Duration::from_secs(10)).await;
                            continue; // retry
                        }
                    }
                    return Err(ServiceError::Http(err));
                }
            }
        }
    }
}

impl MusicCatalog for SpotifyClient {
    async fn user_playlists(&self) -> Result<Vec<Playlist>, ServiceError> {
        let mut playlists: Vec<Playlist> = Vec::new();
        let mut offset = 0u64;

        loop {
            let api_url = format!(
                "{uri}/users/{user}/playlists?limit={limit}&offset={offset}",
                uri = &config::spotify_apiurl(),
                user = &config::spotify_user(),
                limit = PLAYLISTS_PAGE_LIMIT,
                offset = offset
            );
            let page = self.get_json::<GetUserPlaylistsResponse>(&api_url).await?;

            playlists.extend(page.items);
            if page.next.is_none() {
                return Ok(playlists);
            }
            offset += PLAYLISTS_PAGE_LIMIT;
        }
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Track>, ServiceError> {
        let api_url = format!(
            "{uri}/playlists/{id}/tracks?offset={offset}&limit={limit}",
            uri = &config::spotify_apiurl(),
            id = playlist_id,
            offset = offset,
            limit = limit
        );
        let page = self.get_json::<PlaylistItemsResponse>(&api_url).await?;

        Ok(page.items.into_iter().filter_map(|item| item.track).collect())
    }

    async fn track_details(&self, track_ids: &[String]) -> Result<Vec<Track>, ServiceError> {
        let mut tracks: Vec<Track> = Vec::new();

        for chunk in paginate(track_ids, TRACKS_LOOKUP_LIMIT) {
            let ids = chunk
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(",");
            let api_url = format!(
                "{uri}/tracks?ids={ids}",
                uri = &config::spotify_apiurl(),
                ids = ids
            );
            let res = self.get_json::<GetSeveralTracksResponse>(&api_url).await?;
            tracks.extend(res.tracks);
        }

        Ok(tracks)
    }

    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>, ServiceError> {
        let api_url = format!(
            "{uri}/artists/{id}",
            uri = &config::spotify_apiurl(),
            id = artist_id
        );
        let artist = self.get_json::<Artist>(&api_url).await?;
        Ok(artist.genres)
    }

    async fn seed_genres(&self) -> Result<HashSet<String>, ServiceError> {
        let api_url = format!(
            "{uri}/recommendations/available-genre-seeds",
            uri = &config::spotify_apiurl()
        );
        let res = self.get_json::<GenreSeedsResponse>(&api_url).await?;
        Ok(res.genres.into_iter().collect())
    }

    async fn recommendations(
        &self,
        seed: &RecommendationSeed,
        limit: u64,
    ) -> Result<Vec<Track>, ServiceError> {
        let mut api_url = format!(
            "{uri}/recommendations?limit={limit}",
            uri = &config::spotify_apiurl(),
            limit = limit
        );
        if !seed.tracks.is_empty() {
            api_url.push_str(&format!("&seed_tracks={}", seed.tracks.join(",")));
        }
        if !seed.artists.is_empty() {
            api_url.push_str(&format!("&seed_artists={}", seed.artists.join(",")));
        }
        if !seed.genres.is_empty() {
            api_url.push_str(&format!("&seed_genres={}", seed.genres.join(",")));
        }

        let res = self.get_json::<RecommendationsResponse>(&api_url).await?;
        Ok(res.tracks)
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), ServiceError> {
        let api_url = format!(
            "{uri}/playlists/{id}/tracks",
            uri = &config::spotify_apiurl(),
            id = playlist_id
        );
        let body = AddTracksToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let _res = self
            .post_json::<_, AddTracksToPlaylistResponse>(&api_url, &body)
            .await?;
        Ok(())
    }
}
