// SPDX-License-Identifier: GPL-3.0-or-later

//! iTunes Search API client (also serves as the Apple Music lookup path).

use moka::sync::Cache;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

const ITUNES_BASE: &str = "https://itunes.apple.com";

pub struct ItunesClient {
    client: Client,
    base_url: String,
    /// Search results are cached per term; the gap-filling pass tends to
    /// repeat the same artist+title query within a short window.
    search_cache: Cache<String, Vec<ItunesTrack>>,
}

impl ItunesClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url
                .unwrap_or_else(|| ITUNES_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            search_cache: Cache::new(10_000),
        }
    }

    /// Lookup a release by UPC, returning its first song.
    #[instrument(skip(self))]
    pub async fn lookup_by_upc(&self, upc: &str) -> Result<Option<ItunesTrack>, ItunesError> {
        let url = format!("{}/lookup", self.base_url);
        let results = self
            .fetch(&url, &[("upc", upc), ("entity", "song")])
            .await?;
        Ok(results.into_iter().find(|item| item.track_name.is_some()))
    }

    /// Lookup a track or collection by its numeric iTunes id.
    #[instrument(skip(self))]
    pub async fn lookup_by_id(&self, id: &str) -> Result<Option<ItunesTrack>, ItunesError> {
        let url = format!("{}/lookup", self.base_url);
        let results = self.fetch(&url, &[("id", id), ("entity", "song")]).await?;
        Ok(results.into_iter().find(|item| item.track_name.is_some()))
    }

    /// Free-text song search, first result taken unconditionally by
    /// callers. Limit 5 matches the upstream behavior.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str) -> Result<Vec<ItunesTrack>, ItunesError> {
        if let Some(cached) = self.search_cache.get(term) {
            return Ok(cached);
        }

        let url = format!("{}/search", self.base_url);
        let results = self
            .fetch(&url, &[("term", term), ("entity", "song"), ("limit", "5")])
            .await?;

        self.search_cache.insert(term.to_string(), results.clone());
        Ok(results)
    }

    async fn fetch(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<ItunesTrack>, ItunesError> {
        debug!(target: "itunes", url = %url, "GET");
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ItunesError::HttpStatus { status, body });
        }

        let payload: LookupResponse = serde_json::from_str(&body)?;
        Ok(payload.results)
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<ItunesTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItunesTrack {
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
    pub collection_id: Option<u64>,
    pub artist_id: Option<u64>,
    pub artwork_url_100: Option<String>,
    pub track_view_url: Option<String>,
    pub collection_view_url: Option<String>,
    pub release_date: Option<String>,
}

impl ItunesTrack {
    /// iTunes artwork URLs encode their size in the path; swapping the
    /// `100x100` segment yields other resolutions from the same CDN.
    pub fn artwork_at(&self, size: u32) -> Option<String> {
        self.artwork_url_100
            .as_ref()
            .map(|url| url.replace("100x100", &format!("{size}x{size}")))
    }

    /// Release date truncated to its ISO date component.
    pub fn release_day(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .map(|date| date.split('T').next().unwrap_or(date))
    }
}

#[derive(Debug, Error)]
pub enum ItunesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}
