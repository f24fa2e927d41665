pub mod links;
pub mod metadata;
pub mod presaves;

use fanlink_domain::CanonicalTrack;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkResponse {
    pub large: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceUrlsResponse {
    pub spotify_track: Option<String>,
    pub spotify_album: Option<String>,
    pub spotify_artist: Option<String>,
    pub apple_music: Option<String>,
    pub deezer: Option<String>,
    pub youtube: Option<String>,
}

/// Resolved track metadata as returned by the public endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadataResponse {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub release_date: Option<String>,
    pub artwork: ArtworkResponse,
    pub source_urls: SourceUrlsResponse,
}

impl From<CanonicalTrack> for TrackMetadataResponse {
    fn from(track: CanonicalTrack) -> Self {
        Self {
            title: track.title,
            artist: track.artist,
            album: track.album,
            isrc: track.isrc,
            upc: track.upc,
            release_date: track.release_date,
            artwork: ArtworkResponse {
                large: track.artwork.large,
                medium: track.artwork.medium,
                small: track.artwork.small,
            },
            source_urls: SourceUrlsResponse {
                spotify_track: track.source_urls.spotify_track,
                spotify_album: track.source_urls.spotify_album,
                spotify_artist: track.source_urls.spotify_artist,
                apple_music: track.source_urls.apple_music,
                deezer: track.source_urls.deezer,
                youtube: track.source_urls.youtube,
            },
        }
    }
}
