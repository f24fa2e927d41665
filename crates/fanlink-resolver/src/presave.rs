// SPDX-License-Identifier: GPL-3.0-or-later

//! Pre-save link generation.
//!
//! Unlike the merged-track flow, each platform's resolution here is
//! independent: Spotify, Apple Music and Deezer are looked up per
//! platform and either verified or marked unavailable, while the
//! remaining platforms always get search fallbacks. The release-date
//! gate decides whether entries are pre-save or plain streaming links.

use crate::links::search_url;
use crate::resolver::ResolveError;
use crate::similarity::similarity;
use chrono::{NaiveDate, Utc};
use fanlink_domain::{LinkKind, Platform, PlatformLink};
use fanlink_providers::{DeezerClient, ItunesClient, SpotifyClient};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Minimum similarity for an iTunes UPC hit to count as the same
/// release; guards against catalogs answering a UPC lookup with an
/// unrelated compilation.
const CROSS_CHECK_THRESHOLD: u8 = 50;

/// A release counts as out the moment its date arrives, UTC date-only.
pub fn is_released(release_date: NaiveDate) -> bool {
    release_date <= Utc::now().date_naive()
}

/// Spotify URLs found while building pre-save links, kept so the sweep
/// job can persist them on the record.
#[derive(Debug, Clone, Default)]
pub struct SpotifyUrls {
    pub track: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PresaveLinks {
    pub is_released: bool,
    pub links: Vec<PlatformLink>,
    pub spotify_urls: SpotifyUrls,
}

pub struct PresaveLinkGenerator {
    spotify: Arc<SpotifyClient>,
    itunes: Arc<ItunesClient>,
    deezer: Arc<DeezerClient>,
}

impl PresaveLinkGenerator {
    pub fn new(
        spotify: Arc<SpotifyClient>,
        itunes: Arc<ItunesClient>,
        deezer: Arc<DeezerClient>,
    ) -> Self {
        Self {
            spotify,
            itunes,
            deezer,
        }
    }

    /// Build the full pre-save link set for a release.
    #[instrument(skip(self))]
    pub async fn generate(
        &self,
        upc: &str,
        artist: &str,
        title: &str,
        release_date: NaiveDate,
    ) -> Result<PresaveLinks, ResolveError> {
        let released = is_released(release_date);
        let kind = if released {
            LinkKind::Streaming
        } else {
            LinkKind::Presave
        };

        let mut spotify_urls = SpotifyUrls::default();
        let mut links = Vec::with_capacity(Platform::ALL.len());

        for platform in Platform::ALL {
            let link = match platform {
                Platform::Spotify => {
                    self.spotify_link(upc, artist, title, kind, &mut spotify_urls)
                        .await?
                }
                Platform::AppleMusic => self.apple_link(upc, artist, title, kind).await,
                Platform::Deezer => self.deezer_link(upc, artist, title, kind).await,
                other => search_link(other, artist, title, kind),
            };
            links.push(link);
        }

        Ok(PresaveLinks {
            is_released: released,
            links,
            spotify_urls,
        })
    }

    async fn spotify_link(
        &self,
        upc: &str,
        artist: &str,
        title: &str,
        kind: LinkKind,
        spotify_urls: &mut SpotifyUrls,
    ) -> Result<PlatformLink, ResolveError> {
        let found = match self.spotify.find_track_by_upc(upc).await {
            Ok(found) => found,
            Err(error) if error.is_configuration() => {
                return Err(ResolveError::Configuration(error.to_string()));
            }
            Err(error) => {
                warn!(target: "presave", %error, "Spotify UPC lookup failed");
                return Ok(unavailable(
                    Platform::Spotify,
                    "Spotify lookup failed; release may not be indexed yet",
                ));
            }
        };

        match found {
            Some(track) => {
                spotify_urls.track = track.external_urls.spotify.clone();
                spotify_urls.album = track
                    .album
                    .as_ref()
                    .and_then(|album| album.external_urls.spotify.clone());
                spotify_urls.artist = track
                    .primary_artist()
                    .and_then(|artist| artist.external_urls.spotify.clone());

                match spotify_urls.track.clone() {
                    Some(url) => Ok(PlatformLink {
                        platform: Platform::Spotify,
                        url: Some(url),
                        kind,
                        verified: true,
                        reason: None,
                    }),
                    None => Ok(search_link(Platform::Spotify, artist, title, kind)),
                }
            }
            None => Ok(unavailable(
                Platform::Spotify,
                "No Spotify release found for this UPC",
            )),
        }
    }

    async fn apple_link(
        &self,
        upc: &str,
        artist: &str,
        title: &str,
        kind: LinkKind,
    ) -> PlatformLink {
        let found = match self.itunes.lookup_by_upc(upc).await {
            Ok(found) => found,
            Err(error) => {
                warn!(target: "presave", %error, "iTunes UPC lookup failed");
                return unavailable(
                    Platform::AppleMusic,
                    "Apple Music lookup failed; release may not be indexed yet",
                );
            }
        };

        let Some(track) = found else {
            return unavailable(Platform::AppleMusic, "No Apple Music release found for this UPC");
        };

        let artist_score = similarity(artist, track.artist_name.as_deref().unwrap_or(""));
        let title_score = similarity(title, track.track_name.as_deref().unwrap_or(""));
        if artist_score < CROSS_CHECK_THRESHOLD && title_score < CROSS_CHECK_THRESHOLD {
            debug!(
                target: "presave",
                artist_score, title_score, "iTunes UPC hit failed cross-check"
            );
            return unavailable(
                Platform::AppleMusic,
                "Apple Music UPC lookup returned a different release",
            );
        }

        match track
            .track_view_url
            .clone()
            .or_else(|| track.collection_view_url.clone())
        {
            Some(url) => PlatformLink {
                platform: Platform::AppleMusic,
                url: Some(url),
                kind,
                verified: true,
                reason: None,
            },
            None => search_link(Platform::AppleMusic, artist, title, kind),
        }
    }

    async fn deezer_link(
        &self,
        upc: &str,
        artist: &str,
        title: &str,
        kind: LinkKind,
    ) -> PlatformLink {
        // Deezer has no UPC-keyed lookup; the UPC sometimes matches as a
        // plain search term, otherwise artist+title is the fallback.
        for query in [upc.to_string(), format!("{artist} {title}")] {
            match self.deezer.search(&query).await {
                Ok(results) => {
                    if let Some(url) = results.into_iter().next().and_then(|track| track.link) {
                        return PlatformLink {
                            platform: Platform::Deezer,
                            url: Some(url),
                            kind,
                            verified: true,
                            reason: None,
                        };
                    }
                }
                Err(error) => {
                    warn!(target: "presave", %error, "Deezer search failed");
                }
            }
        }

        unavailable(Platform::Deezer, "No Deezer release found for this UPC")
    }
}

fn search_link(platform: Platform, artist: &str, title: &str, kind: LinkKind) -> PlatformLink {
    PlatformLink {
        platform,
        url: Some(search_url(platform, artist, title)),
        kind,
        verified: false,
        reason: None,
    }
}

fn unavailable(platform: Platform, reason: &str) -> PlatformLink {
    PlatformLink {
        platform,
        url: None,
        kind: LinkKind::Unavailable,
        verified: false,
        reason: Some(reason.to_string()),
    }
}
