//! # API Module
//!
//! HTTP endpoints for the local web server that backs the OAuth flow.
//!
//! - [`callback`] - Handles the OAuth callback from Spotify's authorization
//!   server and completes the PKCE token exchange.
//! - [`health`] - Health check endpoint returning status and version.
//!
//! Both handlers are plain async functions wired into an Axum router by
//! [`crate::server::start_api_server`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
