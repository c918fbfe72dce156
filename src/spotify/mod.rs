//! # Spotify Integration Module
//!
//! The integration layer between Morphomatic and the Spotify Web API. It
//! owns all HTTP communication, the OAuth 2.0 PKCE flow, rate-limit
//! handling and response decoding; the expansion core only ever sees the
//! [`crate::expander::MusicCatalog`] capability that [`SpotifyClient`]
//! implements.
//!
//! ## Covered endpoints
//!
//! - `GET /users/{user_id}/playlists` - the user's playlists
//! - `GET /playlists/{id}/tracks` - paged playlist reads
//! - `GET /tracks` - batched track lookups
//! - `GET /artists/{id}` - artist genre tags
//! - `GET /recommendations/available-genre-seeds` - the seed vocabulary
//! - `GET /recommendations` - seeded recommendation queries
//! - `POST /playlists/{id}/tracks` - appending songs
//! - `POST /api/token` - token exchange and refresh
//!
//! ## Error handling
//!
//! 429 Too Many Requests responses are retried after the `Retry-After`
//! delay (up to 120 seconds), 502 Bad Gateway responses after a fixed
//! 10-second pause. Everything else is surfaced as a
//! [`crate::errors::ServiceError`].

pub mod auth;
mod client;

pub use client::SpotifyClient;
