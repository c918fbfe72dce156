use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    error,
    expander::MusicCatalog,
    management::TokenManager,
    spotify::SpotifyClient,
    types::PlaylistTableRow,
    warning,
};

pub async fn list_playlists() {
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

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching your playlists...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let playlists = client.user_playlists().await;
    pb.finish_and_clear();

    match playlists {
        Ok(playlists) => {
            let mut rows: Vec<PlaylistTableRow> = playlists
                .into_iter()
                .map(|p| PlaylistTableRow {
                    name: p.name,
                    tracks: p.tracks.total,
                })
                .collect();
            rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

            let table = Table::new(rows);
            println!("{}", table);
        }
        Err(e) => warning!("Failed to load playlists. Err: {}", e),
    }
}
