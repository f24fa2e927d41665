// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolution orchestrator: classify the input, dispatch to the right
//! provider chain, merge partial results into one canonical track, then
//! backfill gaps from secondary providers.
//!
//! Provider failures are absorbed as "no contribution" and logged; only
//! missing Spotify credentials surface as a hard error, since no other
//! token source exists for Spotify-dependent paths.

use crate::classify::{classify, UpcBounds};
use fanlink_config::AppConfig;
use fanlink_domain::{
    Artwork, CanonicalTrack, InputClassification, ResourceType, UrlPlatform,
};
use fanlink_providers::{
    AudioDbClient, DeezerClient, DeezerTrack, ItunesClient, ItunesTrack, MusicBrainzClient,
    SpotifyClient, SpotifyError, SpotifyOembedClient, SpotifyTrack,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Which provider answers free-text queries. The link-generation flow
/// searches Spotify; the metadata-fetch flow searches iTunes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    Spotify,
    Itunes,
}

/// A successful resolution: the merged track plus the classification
/// that drove it, needed downstream for scoring.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub track: CanonicalTrack,
    pub classification: InputClassification,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{message}")]
    NotFound {
        message: String,
        suggestions: Vec<String>,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ResolveError {
    fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            suggestions: vec![
                "Provide an ISRC code (for example USRC17607839)".to_string(),
                "Provide a direct Spotify track URL".to_string(),
                "Refine the search text to \"Artist - Title\"".to_string(),
            ],
        }
    }
}

pub struct TrackResolver {
    spotify: Arc<SpotifyClient>,
    oembed: SpotifyOembedClient,
    itunes: Arc<ItunesClient>,
    deezer: Arc<DeezerClient>,
    musicbrainz: MusicBrainzClient,
    audiodb: AudioDbClient,
    upc_bounds: UpcBounds,
}

impl TrackResolver {
    /// Clients are shared so the pre-save generator reuses the same
    /// Spotify token cache and search caches.
    pub fn new(
        spotify: Arc<SpotifyClient>,
        itunes: Arc<ItunesClient>,
        deezer: Arc<DeezerClient>,
        config: &AppConfig,
    ) -> Self {
        Self {
            spotify,
            oembed: SpotifyOembedClient::new(config.spotify.oembed_base_url.clone()),
            itunes,
            deezer,
            musicbrainz: MusicBrainzClient::new(config.providers.musicbrainz_base_url.clone()),
            audiodb: AudioDbClient::new(config.providers.audiodb_base_url.clone()),
            upc_bounds: UpcBounds::new(
                config.classifier.link_upc_min_digits,
                config.classifier.link_upc_max_digits,
            ),
        }
    }

    /// Resolve a raw input into canonical track metadata.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        raw: &str,
        query_source: QuerySource,
    ) -> Result<Resolution, ResolveError> {
        let classification = classify(raw, self.upc_bounds);
        debug!(target: "resolver", ?classification, "classified input");

        let track = match &classification {
            InputClassification::Upc { value } => self.resolve_upc(value).await?,
            InputClassification::Isrc { value } => self.resolve_isrc(value).await?,
            InputClassification::PlatformUrl {
                platform,
                resource_type,
                resource_id,
            } => {
                self.resolve_platform_url(*platform, *resource_type, resource_id)
                    .await?
            }
            InputClassification::Query { text } => {
                self.resolve_query(text, query_source).await?
            }
        };

        let Some(mut track) = track else {
            return Err(ResolveError::not_found(format!(
                "No track found for \"{}\"",
                raw.trim()
            )));
        };
        if !track.is_resolved() {
            return Err(ResolveError::not_found(format!(
                "No track found for \"{}\"",
                raw.trim()
            )));
        }

        self.fill_gaps(&mut track).await;
        Ok(Resolution {
            track,
            classification,
        })
    }

    async fn resolve_upc(&self, upc: &str) -> Result<Option<CanonicalTrack>, ResolveError> {
        let found = absorb_spotify(self.spotify.find_track_by_upc(upc).await)?;
        Ok(found.map(|spotify_track| {
            let mut track = track_from_spotify(&spotify_track);
            track.upc = track.upc.or_else(|| Some(upc.to_string()));
            track
        }))
    }

    async fn resolve_isrc(&self, isrc: &str) -> Result<Option<CanonicalTrack>, ResolveError> {
        if let Some(spotify_track) = absorb_spotify(self.spotify.search_track_by_isrc(isrc).await)?
        {
            let mut track = track_from_spotify(&spotify_track);
            track.isrc = track.isrc.or_else(|| Some(isrc.to_string()));
            return Ok(Some(track));
        }

        // Spotify missed; MusicBrainz can still turn the ISRC into a
        // title/artist pair, artwork and URLs come from the gap fill.
        let recording = match self.musicbrainz.search_recording_by_isrc(isrc).await {
            Ok(recording) => recording,
            Err(error) => {
                warn!(target: "resolver", %error, "MusicBrainz lookup failed");
                None
            }
        };

        Ok(recording.map(|recording| {
            let mut track = CanonicalTrack::new(recording.title, recording.artist);
            track.isrc = Some(isrc.to_string());
            track
        }))
    }

    async fn resolve_platform_url(
        &self,
        platform: UrlPlatform,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<Option<CanonicalTrack>, ResolveError> {
        match platform {
            UrlPlatform::Spotify => self.resolve_spotify_url(resource_type, resource_id).await,
            UrlPlatform::AppleMusic => {
                let found = match self.itunes.lookup_by_id(resource_id).await {
                    Ok(found) => found,
                    Err(error) => {
                        warn!(target: "resolver", %error, "iTunes lookup failed");
                        None
                    }
                };
                Ok(found.as_ref().map(track_from_itunes))
            }
            UrlPlatform::Deezer => {
                let found = match self.deezer.get_track(resource_id).await {
                    Ok(track) => Some(track),
                    Err(error) => {
                        warn!(target: "resolver", %error, "Deezer fetch failed");
                        None
                    }
                };
                Ok(found.as_ref().map(track_from_deezer))
            }
            // YouTube URLs carry no catalog metadata; callers that want
            // the raw video id handle it before resolution.
            UrlPlatform::Youtube => Ok(None),
        }
    }

    async fn resolve_spotify_url(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<Option<CanonicalTrack>, ResolveError> {
        let api_result = match resource_type {
            ResourceType::Track => self.spotify.get_track(resource_id).await.map(Some),
            ResourceType::Album => match self.spotify.get_album(resource_id).await {
                Ok(album) => match album.tracks.as_ref().and_then(|page| page.items.first()) {
                    Some(first) => self.spotify.get_track(&first.id).await.map(Some),
                    None => Ok(None),
                },
                Err(error) => Err(error),
            },
            _ => Ok(None),
        };

        match api_result {
            Ok(found) => Ok(found.as_ref().map(track_from_spotify)),
            Err(error) => {
                // Full API resolution failed (typically no credentials);
                // the unauthenticated oEmbed endpoint still yields
                // title/artist/thumbnail.
                debug!(target: "resolver", %error, "falling back to oEmbed");
                let spotify_url = format!(
                    "https://open.spotify.com/{}/{}",
                    resource_type, resource_id
                );
                match self.oembed.fetch(&spotify_url).await {
                    Ok(oembed) => {
                        let mut track = CanonicalTrack::new(oembed.title, oembed.artist);
                        track.artwork.medium = oembed.thumbnail_url;
                        if resource_type == ResourceType::Track {
                            track.source_urls.spotify_track = Some(spotify_url);
                        }
                        Ok(Some(track))
                    }
                    Err(oembed_error) => {
                        warn!(target: "resolver", %oembed_error, "oEmbed fallback failed");
                        Ok(None)
                    }
                }
            }
        }
    }

    async fn resolve_query(
        &self,
        text: &str,
        query_source: QuerySource,
    ) -> Result<Option<CanonicalTrack>, ResolveError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        match query_source {
            QuerySource::Spotify => {
                let mut tracks = absorb_spotify(self.spotify.search_tracks(text, 1).await)?;
                Ok(if tracks.is_empty() {
                    None
                } else {
                    Some(track_from_spotify(&tracks.remove(0)))
                })
            }
            QuerySource::Itunes => {
                let results = match self.itunes.search(text).await {
                    Ok(results) => results,
                    Err(error) => {
                        warn!(target: "resolver", %error, "iTunes search failed");
                        Vec::new()
                    }
                };
                Ok(results.first().map(track_from_itunes))
            }
        }
    }

    /// Backfill still-missing platform URLs and artwork. Runs whenever
    /// title and artist are known, regardless of which branch produced
    /// them. Each secondary provider is consulted only if its field is
    /// still empty; the lookups are independent and run concurrently.
    async fn fill_gaps(&self, track: &mut CanonicalTrack) {
        let query = format!("{} {}", track.artist, track.title);
        let needs_deezer = track.source_urls.deezer.is_none();
        let needs_itunes =
            track.source_urls.apple_music.is_none() || track.artwork.is_empty();
        let needs_audiodb = track.artwork.is_empty();

        let (deezer_hit, itunes_hit, audiodb_hit) = tokio::join!(
            async {
                if !needs_deezer {
                    return None;
                }
                match self.deezer.search(&query).await {
                    Ok(results) => results.into_iter().next(),
                    Err(error) => {
                        debug!(target: "resolver", %error, "Deezer gap fill failed");
                        None
                    }
                }
            },
            async {
                if !needs_itunes {
                    return None;
                }
                match self.itunes.search(&query).await {
                    Ok(results) => results.into_iter().next(),
                    Err(error) => {
                        debug!(target: "resolver", %error, "iTunes gap fill failed");
                        None
                    }
                }
            },
            async {
                if !needs_audiodb {
                    return None;
                }
                match self.audiodb.search_track(&track.artist, &track.title).await {
                    Ok(hit) => hit,
                    Err(error) => {
                        debug!(target: "resolver", %error, "AudioDB gap fill failed");
                        None
                    }
                }
            },
        );

        if let Some(hit) = deezer_hit {
            merge(track, &track_from_deezer(&hit));
        }
        if let Some(hit) = itunes_hit {
            merge(track, &track_from_itunes(&hit));
        }
        if let Some(hit) = audiodb_hit {
            if track.artwork.is_empty() {
                track.artwork.medium = hit.str_track_thumb;
            }
        }
    }
}

/// Absorb a Spotify result: configuration problems are fatal, provider
/// hiccups count as no contribution.
fn absorb_spotify<T: Default>(result: Result<T, SpotifyError>) -> Result<T, ResolveError> {
    match result {
        Ok(value) => Ok(value),
        Err(error) if error.is_configuration() => {
            Err(ResolveError::Configuration(error.to_string()))
        }
        Err(error) => {
            warn!(target: "resolver", %error, "Spotify lookup failed");
            Ok(T::default())
        }
    }
}

fn track_from_spotify(spotify: &SpotifyTrack) -> CanonicalTrack {
    let artist = spotify
        .primary_artist()
        .map(|artist| artist.name.clone())
        .unwrap_or_default();
    let mut track = CanonicalTrack::new(spotify.name.clone(), artist);
    track.isrc = spotify.external_ids.isrc.clone();
    track.source_urls.spotify_track = spotify.external_urls.spotify.clone();
    track.source_urls.spotify_artist = spotify
        .primary_artist()
        .and_then(|artist| artist.external_urls.spotify.clone());
    track.artist_id = spotify
        .primary_artist()
        .and_then(|artist| artist.id.clone());

    if let Some(album) = &spotify.album {
        track.album = Some(album.name.clone());
        track.album_id = Some(album.id.clone());
        track.upc = album.external_ids.upc.clone();
        track.release_date = album.release_date.clone();
        track.source_urls.spotify_album = album.external_urls.spotify.clone();
        track.artwork = Artwork {
            large: album.image_url(0).map(str::to_string),
            medium: album.image_url(1).map(str::to_string),
            small: album.image_url(2).map(str::to_string),
        };
    }
    track
}

fn track_from_itunes(itunes: &ItunesTrack) -> CanonicalTrack {
    let mut track = CanonicalTrack::new(
        itunes.track_name.clone().unwrap_or_default(),
        itunes.artist_name.clone().unwrap_or_default(),
    );
    track.album = itunes.collection_name.clone();
    track.album_id = itunes.collection_id.map(|id| id.to_string());
    track.artist_id = itunes.artist_id.map(|id| id.to_string());
    track.release_date = itunes.release_day().map(str::to_string);
    track.source_urls.apple_music = itunes
        .track_view_url
        .clone()
        .or_else(|| itunes.collection_view_url.clone());
    track.artwork = Artwork {
        large: itunes.artwork_at(600),
        medium: itunes.artwork_url_100.clone(),
        small: itunes.artwork_at(60),
    };
    track
}

fn track_from_deezer(deezer: &DeezerTrack) -> CanonicalTrack {
    let artist = deezer
        .artist
        .as_ref()
        .map(|artist| artist.name.clone())
        .unwrap_or_default();
    let mut track = CanonicalTrack::new(deezer.title.clone(), artist);
    track.isrc = deezer.isrc.clone();
    track.release_date = deezer.release_date.clone();
    track.source_urls.deezer = deezer.link.clone();
    if let Some(album) = &deezer.album {
        track.album = Some(album.title.clone());
        track.album_id = Some(album.id.to_string());
        track.artwork = Artwork {
            large: album.cover_big.clone(),
            medium: album.cover_medium.clone(),
            small: album.cover_small.clone(),
        };
    }
    track
}

/// First non-null wins per field; the existing track's values always
/// take precedence over the incoming partial.
fn merge(track: &mut CanonicalTrack, partial: &CanonicalTrack) {
    if track.album.is_none() {
        track.album = partial.album.clone();
    }
    if track.album_id.is_none() {
        track.album_id = partial.album_id.clone();
    }
    if track.artist_id.is_none() {
        track.artist_id = partial.artist_id.clone();
    }
    if track.isrc.is_none() {
        track.isrc = partial.isrc.clone();
    }
    if track.upc.is_none() {
        track.upc = partial.upc.clone();
    }
    if track.release_date.is_none() {
        track.release_date = partial.release_date.clone();
    }
    if track.source_urls.apple_music.is_none() {
        track.source_urls.apple_music = partial.source_urls.apple_music.clone();
    }
    if track.source_urls.deezer.is_none() {
        track.source_urls.deezer = partial.source_urls.deezer.clone();
    }
    if track.artwork.large.is_none() {
        track.artwork.large = partial.artwork.large.clone();
    }
    if track.artwork.medium.is_none() {
        track.artwork.medium = partial.artwork.medium.clone();
    }
    if track.artwork.small.is_none() {
        track.artwork.small = partial.artwork.small.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial_with(album: &str, deezer_url: &str) -> CanonicalTrack {
        let mut partial = CanonicalTrack::new("One Dance", "Drake");
        partial.album = Some(album.to_string());
        partial.source_urls.deezer = Some(deezer_url.to_string());
        partial
    }

    #[test]
    fn merge_fills_only_missing_fields() {
        let mut track = CanonicalTrack::new("One Dance", "Drake");
        track.album = Some("Views".into());

        merge(&mut track, &partial_with("Wrong Album", "https://dzr/1"));
        assert_eq!(track.album.as_deref(), Some("Views"));
        assert_eq!(track.source_urls.deezer.as_deref(), Some("https://dzr/1"));
    }

    #[test]
    fn merge_fills_artwork_per_slot() {
        let mut track = CanonicalTrack::new("One Dance", "Drake");
        track.artwork.large = Some("large.jpg".into());

        let mut partial = CanonicalTrack::new("One Dance", "Drake");
        partial.artwork.large = Some("other-large.jpg".into());
        partial.artwork.medium = Some("medium.jpg".into());

        merge(&mut track, &partial);
        assert_eq!(track.artwork.large.as_deref(), Some("large.jpg"));
        assert_eq!(track.artwork.medium.as_deref(), Some("medium.jpg"));
    }

    #[test]
    fn not_found_carries_suggestions() {
        let error = ResolveError::not_found("No track found");
        match error {
            ResolveError::NotFound { suggestions, .. } => {
                assert!(!suggestions.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
