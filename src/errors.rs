//! Typed error kinds for the expansion workflow.
//!
//! The expander core returns these instead of printing and exiting so that
//! the CLI boundary can decide how a failure is surfaced. Only the CLI layer
//! turns them into terminal output.

use thiserror::Error;

/// Failures while talking to the Spotify Web API.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("unexpected API response: {0}")]
    UnexpectedResponse(String),
}

/// Failures of a single `expand` invocation.
///
/// Everything here is raised to the orchestrator boundary and surfaced to
/// the caller as one failure with a descriptive message. A failed batch is
/// not retried; earlier batches may already have been added.
#[derive(Error, Debug)]
pub enum ExpandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("playlist '{0}' is not in your playlists")]
    PlaylistNotFound(String),

    #[error("playlist has {have} tracks but at least {need} are required")]
    InsufficientTracks { have: u64, need: u64 },

    #[error("no usable seed genre found after {0} sampling attempts")]
    GenreNotFound(u32),

    #[error("music catalog request failed: {0}")]
    Service(#[from] ServiceError),
}
