use std::io::{self, Write};

use crate::{
    error,
    expander::{Expander, ManualGenreProvider},
    info,
    management::TokenManager,
    spotify::SpotifyClient,
    success,
    utils::Confirmation,
};

/// Interactive genre source for the manual fallback: asks on stdin, with
/// the retry question decoded into [`Confirmation`] at the boundary.
struct PromptGenreProvider;

impl PromptGenreProvider {
    fn read_line(prompt: &str) -> Option<String> {
        print!("{}", prompt);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return None;
        }
        let answer = answer.trim().to_lowercase();
        if answer.is_empty() { None } else { Some(answer) }
    }
}

impl ManualGenreProvider for PromptGenreProvider {
    fn request_genre(&mut self) -> Option<String> {
        Self::read_line("Enter a seed genre manually: ")
    }

    fn confirm_retry(&mut self) -> bool {
        loop {
            let Some(answer) = Self::read_line("Try another genre? (y/n): ") else {
                return false;
            };
            match answer.parse::<Confirmation>() {
                Ok(Confirmation::Yes) => return true,
                Ok(Confirmation::No) => return false,
                Err(_) => continue,
            }
        }
    }
}

pub async fn expand(playlist: String, count: u64) {
    let token_mgr = match TokenManager::load().await {
        Ok(t) => t,
        Err(e) => {
            error!(
                "Failed to load token. Please run morphomatic auth\n Error: {}",
                e
            );
        }
    };
    let client = SpotifyClient::new(token_mgr);
    let expander = Expander::new(&client);
    let mut provider = PromptGenreProvider;

    info!("Expanding playlist '{}' by {} song(s)...", playlist, count);

    match expander.expand(&playlist, count, &mut provider).await {
        Ok(summary) => {
            if summary.duplicates_skipped > 0 {
                info!(
                    "{} recommendation(s) were already in the playlist.",
                    summary.duplicates_skipped
                );
            }
            success!(
                "Added {} of {} requested song(s) to '{}'.",
                summary.added,
                summary.requested,
                summary.playlist_name
            );
        }
        Err(e) => error!("Failed to expand playlist: {}", e),
    }
}
