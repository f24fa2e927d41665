// SPDX-License-Identifier: GPL-3.0-or-later

//! Spotify oEmbed client.
//!
//! Unauthenticated endpoint used when full API resolution is unavailable
//! (typically because no client credentials are configured). The oEmbed
//! title comes back as a single `"Track - Artist"` string; splitting it
//! on the first `" - "` is a heuristic and misbehaves for titles that
//! themselves contain the separator.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

const OEMBED_BASE: &str = "https://open.spotify.com";

/// Placeholder artist when the oEmbed title has no separator to split on.
const UNKNOWN_ARTIST: &str = "Unknown Artist";

pub struct SpotifyOembedClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OembedTrack {
    pub title: String,
    pub artist: String,
    pub thumbnail_url: Option<String>,
}

impl SpotifyOembedClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url
                .unwrap_or_else(|| OEMBED_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Fetch title/artist/thumbnail for a bare Spotify URL.
    #[instrument(skip(self))]
    pub async fn fetch(&self, spotify_url: &str) -> Result<OembedTrack, OembedError> {
        let url = format!("{}/oembed", self.base_url);
        debug!(target: "oembed", url = %url, "fetching oEmbed metadata");

        let response = self
            .client
            .get(&url)
            .query(&[("url", spotify_url)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OembedError::HttpStatus { status, body });
        }

        let payload: OembedResponse = serde_json::from_str(&body)?;
        let (title, artist) = split_title(&payload.title);

        Ok(OembedTrack {
            title,
            artist,
            thumbnail_url: payload.thumbnail_url,
        })
    }
}

/// Split an oEmbed `"Track - Artist"` title into its halves. Without a
/// separator the whole string is the title and the artist falls back to
/// a literal placeholder.
fn split_title(raw: &str) -> (String, String) {
    match raw.split_once(" - ") {
        Some((title, artist)) => (title.trim().to_string(), artist.trim().to_string()),
        None => (raw.trim().to_string(), UNKNOWN_ARTIST.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct OembedResponse {
    #[serde(default)]
    title: String,
    thumbnail_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum OembedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}
