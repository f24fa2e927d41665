// SPDX-License-Identifier: GPL-3.0-or-later

//! Spotify Web API client using the client-credentials flow.
//!
//! The app-level bearer token is cached process-wide until shortly before
//! its declared expiry. Concurrent requests racing to refresh may issue
//! duplicate token exchanges; the exchange is idempotent and side-effect
//! free, so no locking is held across it.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::time::{Duration, Instant};
use tracing::{debug, instrument};

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Leeway subtracted from the provider-declared token lifetime so a token
/// is never used in its final seconds.
const TOKEN_EXPIRY_LEEWAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Process-wide cache for the client-credentials bearer token.
///
/// Acquired lazily, valid until expiry, refreshed on next use. Shared
/// read-mostly state; the mutex only guards the swap, never a network
/// call.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token if still valid.
    pub fn get(&self) -> Option<String> {
        let guard = self.inner.lock().expect("token cache lock");
        guard
            .as_ref()
            .filter(|token| token.expires_at > Instant::now())
            .map(|token| token.value.clone())
    }

    /// Store a freshly exchanged token with its declared lifetime.
    pub fn store(&self, value: impl Into<String>, expires_in: Duration) {
        let lifetime = expires_in
            .checked_sub(TOKEN_EXPIRY_LEEWAY)
            .unwrap_or(Duration::ZERO);
        let mut guard = self.inner.lock().expect("token cache lock");
        *guard = Some(CachedToken {
            value: value.into(),
            expires_at: Instant::now() + lifetime,
        });
    }

    /// Drop the cached token so the next use re-exchanges credentials.
    pub fn invalidate(&self) {
        let mut guard = self.inner.lock().expect("token cache lock");
        *guard = None;
    }
}

#[derive(Debug, Clone)]
struct Credentials {
    client_id: String,
    client_secret: String,
}

pub struct SpotifyClient {
    client: Client,
    credentials: Option<Credentials>,
    token_cache: TokenCache,
    api_base_url: String,
    token_url: String,
}

impl SpotifyClient {
    /// Creates a client with production endpoints. Credentials may be
    /// absent; any lookup will then fail with `MissingCredentials`.
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self::new_with_base_urls(client_id, client_secret, None, None)
    }

    pub fn new_with_base_urls(
        client_id: Option<String>,
        client_secret: Option<String>,
        api_base_url: Option<String>,
        token_url: Option<String>,
    ) -> Self {
        let credentials = match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.trim().is_empty() && !secret.trim().is_empty() => {
                Some(Credentials {
                    client_id: id.trim().to_string(),
                    client_secret: secret.trim().to_string(),
                })
            }
            _ => None,
        };

        Self {
            client: Client::new(),
            credentials,
            token_cache: TokenCache::new(),
            api_base_url: api_base_url
                .unwrap_or_else(|| SPOTIFY_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            token_url: token_url.unwrap_or_else(|| SPOTIFY_TOKEN_URL.to_string()),
        }
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }

    /// Search for a track by ISRC (`isrc:<code>` track search).
    #[instrument(skip(self))]
    pub async fn search_track_by_isrc(
        &self,
        isrc: &str,
    ) -> Result<Option<SpotifyTrack>, SpotifyError> {
        let mut tracks = self
            .search_tracks(&format!("isrc:{}", isrc.to_uppercase()), 1)
            .await?;
        Ok(if tracks.is_empty() {
            None
        } else {
            Some(tracks.remove(0))
        })
    }

    /// Free-text track search. Results come back in provider order; the
    /// caller takes the first as best match.
    #[instrument(skip(self))]
    pub async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SpotifyTrack>, SpotifyError> {
        let url = format!("{}/search", self.api_base_url);
        let response: TrackSearchResponse = self
            .get(&url, &[("q", query), ("type", "track"), ("limit", &limit.to_string())])
            .await?;
        Ok(response.tracks.map(|page| page.items).unwrap_or_default())
    }

    /// Resolve a UPC to a full track. Spotify has no UPC-to-track search,
    /// so this is a three-hop lookup: album search by `upc:<code>`, fetch
    /// the album's first track, then fetch that track in full.
    #[instrument(skip(self))]
    pub async fn find_track_by_upc(
        &self,
        upc: &str,
    ) -> Result<Option<SpotifyTrack>, SpotifyError> {
        let Some(album) = self.search_album_by_upc(upc).await? else {
            return Ok(None);
        };

        let album = self.get_album(&album.id).await?;
        let Some(first_track) = album
            .tracks
            .as_ref()
            .and_then(|page| page.items.first())
        else {
            debug!(target: "spotify", album_id = %album.id, "album has no tracks");
            return Ok(None);
        };

        let track = self.get_track(&first_track.id).await?;
        Ok(Some(track))
    }

    /// Album search keyed by UPC. Returns the first hit, if any.
    #[instrument(skip(self))]
    pub async fn search_album_by_upc(
        &self,
        upc: &str,
    ) -> Result<Option<SpotifyAlbum>, SpotifyError> {
        let url = format!("{}/search", self.api_base_url);
        let query = format!("upc:{}", upc);
        let mut response: AlbumSearchResponse = self
            .get(&url, &[("q", query.as_str()), ("type", "album"), ("limit", "1")])
            .await?;
        Ok(response
            .albums
            .as_mut()
            .filter(|page| !page.items.is_empty())
            .map(|page| page.items.remove(0)))
    }

    #[instrument(skip(self))]
    pub async fn get_track(&self, id: &str) -> Result<SpotifyTrack, SpotifyError> {
        let url = format!("{}/tracks/{}", self.api_base_url, id);
        self.get(&url, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_album(&self, id: &str) -> Result<SpotifyAlbum, SpotifyError> {
        let url = format!("{}/albums/{}", self.api_base_url, id);
        self.get(&url, &[]).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SpotifyError> {
        let token = self.bearer_token().await?;

        debug!(target: "spotify", url = %url, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            // Token revoked before its declared expiry; next request
            // will re-exchange credentials.
            self.token_cache.invalidate();
        }
        if !status.is_success() {
            return Err(SpotifyError::HttpStatus {
                status,
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Cached bearer token, exchanging credentials if absent or expired.
    async fn bearer_token(&self) -> Result<String, SpotifyError> {
        if let Some(token) = self.token_cache.get() {
            return Ok(token);
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(SpotifyError::MissingCredentials)?;

        debug!(target: "spotify", "exchanging client credentials for token");
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SpotifyError::TokenExchange { status, body });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        self.token_cache
            .store(&token.access_token, Duration::from_secs(token.expires_in));
        Ok(token.access_token)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtistRef>,
    pub album: Option<SpotifyAlbum>,
    #[serde(default)]
    pub external_ids: ExternalIds,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl SpotifyTrack {
    pub fn primary_artist(&self) -> Option<&SpotifyArtistRef> {
        self.artists.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtistRef {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub id: String,
    pub name: String,
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtistRef>,
    #[serde(default)]
    pub external_ids: ExternalIds,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub tracks: Option<TrackPage>,
}

impl SpotifyAlbum {
    /// Image URL at the given index in Spotify's largest-first ordering.
    pub fn image_url(&self, index: usize) -> Option<&str> {
        self.images.get(index).map(|image| image.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalIds {
    pub isrc: Option<String>,
    pub upc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<SimplifiedTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimplifiedTrack {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TrackSearchResponse {
    tracks: Option<SearchPage<SpotifyTrack>>,
}

#[derive(Debug, Deserialize)]
struct AlbumSearchResponse {
    albums: Option<SearchPage<SpotifyAlbum>>,
}

#[derive(Debug, Deserialize)]
struct SearchPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Error type returned by the Spotify API client.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Client id/secret not configured; fatal for any Spotify-dependent
    /// lookup since no fallback token source exists.
    #[error("Spotify client credentials not configured")]
    MissingCredentials,
    /// The token endpoint rejected the credential exchange.
    #[error("token exchange failed with status {status}: {body}")]
    TokenExchange { status: StatusCode, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl SpotifyError {
    /// True when the failure is a configuration problem rather than a
    /// provider hiccup. Configuration failures surface to the caller;
    /// everything else is absorbed as "no contribution".
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_cache_returns_valid_token() {
        let cache = TokenCache::new();
        assert!(cache.get().is_none());

        cache.store("abc", Duration::from_secs(3600));
        assert_eq!(cache.get().as_deref(), Some("abc"));
    }

    #[test]
    fn token_cache_expires_short_lifetimes_immediately() {
        let cache = TokenCache::new();
        // Lifetime shorter than the leeway is treated as already expired.
        cache.store("abc", Duration::from_secs(10));
        assert!(cache.get().is_none());
    }

    #[test]
    fn token_cache_invalidate_drops_token() {
        let cache = TokenCache::new();
        cache.store("abc", Duration::from_secs(3600));
        cache.invalidate();
        assert!(cache.get().is_none());
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let client = SpotifyClient::new(Some("  ".into()), Some("secret".into()));
        assert!(client.credentials.is_none());
    }
}
