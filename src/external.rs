//! Outbound links for catalog entries. URLs are derived from the entry
//! title at click time; nothing is stored.

use std::io;
use std::process::Command;

use log::{info, warn};

/// MyAnimeList search for an entry title.
pub fn explore_url(title: &str) -> String {
    format!(
        "https://myanimelist.net/search/all?q={}",
        urlencoding::encode(title)
    )
}

/// YouTube search for an entry's trailer. Used when the entry carries no
/// explicit trailer link.
pub fn trailer_search_url(title: &str) -> String {
    let query = format!("{title} official trailer anime");
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(&query)
    )
}

/// Trailer target for an entry: its own link if present, otherwise a
/// YouTube search on the title.
pub fn trailer_url(title: &str, explicit: Option<&str>) -> String {
    match explicit {
        Some(url) => url.to_string(),
        None => trailer_search_url(title),
    }
}

/// Hand a URL to the platform's default browser. Detaches immediately;
/// the spawned opener owns the rest.
pub fn open_in_browser(url: &str) -> io::Result<()> {
    info!("opening {url}");

    #[cfg(target_os = "linux")]
    let result = Command::new("xdg-open").arg(url).spawn();

    #[cfg(target_os = "macos")]
    let result = Command::new("open").arg(url).spawn();

    #[cfg(target_os = "windows")]
    let result = Command::new("cmd").args(["/C", "start", "", url]).spawn();

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            warn!("failed to open browser: {e}");
            Err(e)
        }
    }
}
