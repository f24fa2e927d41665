// SPDX-License-Identifier: GPL-3.0-or-later

//! MusicBrainz recording search, used as a title/artist fallback when a
//! Spotify ISRC search misses. The API policy requires a descriptive
//! User-Agent and at most one request per second.

use crate::pacer::Pacer;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const MUSICBRAINZ_API_BASE: &str = "https://musicbrainz.org/ws/2";
const USER_AGENT: &str = concat!(
    "Fanlink/",
    env!("CARGO_PKG_VERSION"),
    " ( https://github.com/fanlink/fanlink )"
);

#[derive(Debug, Clone)]
pub struct MusicBrainzClient {
    client: Client,
    base_url: String,
    pacer: Pacer,
}

impl MusicBrainzClient {
    pub fn new(base_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url
                .unwrap_or_else(|| MUSICBRAINZ_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            pacer: Pacer::musicbrainz_default(),
        }
    }

    /// Recording search by ISRC. Returns the first recording's title and
    /// artist credit, if any.
    #[instrument(skip(self))]
    pub async fn search_recording_by_isrc(
        &self,
        isrc: &str,
    ) -> Result<Option<RecordingMatch>, MusicBrainzError> {
        let mut url = Url::parse(&format!("{}/recording", self.base_url))
            .map_err(|e| MusicBrainzError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("query", &format!("isrc:{}", isrc.to_uppercase()))
            .append_pair("fmt", "json")
            .append_pair("limit", "5");

        self.pacer.pause().await;

        debug!(target: "musicbrainz", url = %url, "searching recordings");
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(MusicBrainzError::RateLimitExceeded);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MusicBrainzError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let payload: RecordingSearchResponse = serde_json::from_str(&body)
            .map_err(|e| MusicBrainzError::InvalidResponse(e.to_string()))?;

        Ok(payload.recordings.into_iter().next().map(|recording| {
            let artist = recording
                .artist_credit
                .first()
                .map(|credit| credit.display_name().to_string())
                .unwrap_or_default();
            RecordingMatch {
                mbid: recording.id,
                title: recording.title,
                artist,
            }
        }))
    }
}

/// Title/artist pair extracted from the best recording hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingMatch {
    pub mbid: String,
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Deserialize)]
struct RecordingSearchResponse {
    #[serde(default)]
    recordings: Vec<Recording>,
}

#[derive(Debug, Deserialize)]
struct Recording {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ArtistCredit>,
}

#[derive(Debug, Deserialize)]
struct ArtistCredit {
    name: Option<String>,
    artist: Option<CreditedArtist>,
}

impl ArtistCredit {
    /// Credit name as written, falling back to the artist's canonical name.
    fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.artist.as_ref().map(|artist| artist.name.as_str()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct CreditedArtist {
    name: String,
}

#[derive(Debug, Error)]
pub enum MusicBrainzError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid response from MusicBrainz API: {0}")]
    InvalidResponse(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
}
