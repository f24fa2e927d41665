// SPDX-License-Identifier: GPL-3.0-or-later

//! TheAudioDB track search, consulted only to backfill artwork when no
//! other provider supplied any.

use moka::sync::Cache;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

const AUDIODB_BASE: &str = "https://www.theaudiodb.com";

pub struct AudioDbClient {
    client: Client,
    base_url: String,
    cache: Cache<String, Option<AudioDbTrack>>,
}

impl AudioDbClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url
                .unwrap_or_else(|| AUDIODB_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            cache: Cache::new(10_000),
        }
    }

    /// Artist+track search; the first hit with a thumbnail wins.
    #[instrument(skip(self))]
    pub async fn search_track(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<AudioDbTrack>, AudioDbError> {
        let cache_key = format!("{}:{}", artist, title);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let url = format!("{}/api/v1/json/2/searchtrack.php", self.base_url);
        debug!(target: "audiodb", url = %url, "searching track");

        let response = self
            .client
            .get(&url)
            .query(&[("s", artist), ("t", title)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AudioDbError::HttpStatus { status, body });
        }

        let payload: SearchResponse = serde_json::from_str(&body)?;
        let track = payload
            .track
            .unwrap_or_default()
            .into_iter()
            .find(|track| track.str_track_thumb.is_some());

        self.cache.insert(cache_key, track.clone());
        Ok(track)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// AudioDB sends a JSON `null` rather than an empty array on miss.
    track: Option<Vec<AudioDbTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioDbTrack {
    #[serde(rename = "strTrack")]
    pub str_track: Option<String>,
    #[serde(rename = "strArtist")]
    pub str_artist: Option<String>,
    #[serde(rename = "strAlbum")]
    pub str_album: Option<String>,
    #[serde(rename = "strTrackThumb")]
    pub str_track_thumb: Option<String>,
}

#[derive(Debug, Error)]
pub enum AudioDbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}
