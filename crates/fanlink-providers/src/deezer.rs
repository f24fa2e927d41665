// SPDX-License-Identifier: GPL-3.0-or-later

//! Deezer public API client. No authentication required; API-level
//! errors come back as a 200 with an `error` object in the body.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

const DEEZER_BASE: &str = "https://api.deezer.com";

pub struct DeezerClient {
    client: Client,
    base_url: String,
}

impl DeezerClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url
                .unwrap_or_else(|| DEEZER_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Direct track fetch by Deezer id.
    #[instrument(skip(self))]
    pub async fn get_track(&self, id: &str) -> Result<DeezerTrack, DeezerError> {
        let url = format!("{}/track/{}", self.base_url, id);
        let value = self.fetch(&url, &[]).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Free-text search, limit 5, first result taken by callers.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<DeezerTrack>, DeezerError> {
        let url = format!("{}/search", self.base_url);
        let value = self.fetch(&url, &[("q", query), ("limit", "5")]).await?;
        let payload: SearchResponse = serde_json::from_value(value)?;
        Ok(payload.data)
    }

    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, DeezerError> {
        debug!(target: "deezer", url = %url, "GET");
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        parse_deezer_body(status, &body)
    }
}

fn parse_deezer_body(status: StatusCode, response_body: &str) -> Result<Value, DeezerError> {
    if !status.is_success() {
        return Err(DeezerError::HttpStatus {
            status,
            body: response_body.to_string(),
        });
    }

    let value: Value = serde_json::from_str(response_body)?;
    if let Some(message) = value
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
    {
        return Err(DeezerError::Api {
            message: message.to_string(),
        });
    }

    Ok(value)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<DeezerTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerTrack {
    pub id: u64,
    pub title: String,
    pub link: Option<String>,
    pub isrc: Option<String>,
    pub release_date: Option<String>,
    pub artist: Option<DeezerArtist>,
    pub album: Option<DeezerAlbum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerArtist {
    pub id: u64,
    pub name: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerAlbum {
    pub id: u64,
    pub title: String,
    pub cover_big: Option<String>,
    pub cover_medium: Option<String>,
    pub cover_small: Option<String>,
}

#[derive(Debug, Error)]
pub enum DeezerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("Deezer API error: {message}")]
    Api { message: String },
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}
