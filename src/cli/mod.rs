//! # CLI Module
//!
//! The user-facing command layer. Each command delegates to the spotify
//! client and the expander core, handles progress feedback and turns typed
//! errors into terminal output.
//!
//! - [`auth`] - Spotify OAuth authentication flow with PKCE security
//! - [`list_playlists`] - Tabular listing of the user's playlists
//! - [`expand`] - Expand a playlist by a number of recommended songs

mod auth;
mod expand;
mod playlists;

pub use auth::auth;
pub use expand::expand;
pub use playlists::list_playlists;
