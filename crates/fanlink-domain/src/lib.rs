// SPDX-License-Identifier: GPL-3.0-or-later
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Value Objects & IDs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresaveId(pub Uuid);

impl PresaveId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PresaveId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PresaveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Platforms
// ============================================================================

/// Streaming platforms a fanlink page can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Spotify,
    AppleMusic,
    Youtube,
    Deezer,
    Audiomack,
    Boomplay,
    Tidal,
    Amazon,
    Soundcloud,
    Shazam,
}

impl Platform {
    /// Every platform a link set must cover, in stable output order.
    pub const ALL: [Platform; 10] = [
        Platform::Spotify,
        Platform::AppleMusic,
        Platform::Youtube,
        Platform::Deezer,
        Platform::Audiomack,
        Platform::Boomplay,
        Platform::Tidal,
        Platform::Amazon,
        Platform::Soundcloud,
        Platform::Shazam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::AppleMusic => "apple_music",
            Self::Youtube => "youtube",
            Self::Deezer => "deezer",
            Self::Audiomack => "audiomack",
            Self::Boomplay => "boomplay",
            Self::Tidal => "tidal",
            Self::Amazon => "amazon",
            Self::Soundcloud => "soundcloud",
            Self::Shazam => "shazam",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Input classification
// ============================================================================

/// Resource kinds extractable from a streaming-platform URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Track,
    Album,
    Artist,
    Song,
    Video,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Track => write!(f, "track"),
            Self::Album => write!(f, "album"),
            Self::Artist => write!(f, "artist"),
            Self::Song => write!(f, "song"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Platforms whose URLs the classifier understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlPlatform {
    Spotify,
    AppleMusic,
    Deezer,
    Youtube,
}

/// The classified form of a raw user input. Derived once per request,
/// never mutated. Classification is total: unrecognized input is a Query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputClassification {
    Upc {
        value: String,
    },
    Isrc {
        value: String,
    },
    PlatformUrl {
        platform: UrlPlatform,
        resource_type: ResourceType,
        resource_id: String,
    },
    Query {
        text: String,
    },
}

impl InputClassification {
    /// True for the classifications that carry a catalog identifier.
    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::Upc { .. } | Self::Isrc { .. })
    }
}

// ============================================================================
// Canonical track
// ============================================================================

/// Artwork URLs at descending resolutions. Any slot may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub large: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
}

impl Artwork {
    pub fn is_empty(&self) -> bool {
        self.large.is_none() && self.medium.is_none() && self.small.is_none()
    }

    /// Best available URL, preferring higher resolution.
    pub fn best(&self) -> Option<&str> {
        self.large
            .as_deref()
            .or(self.medium.as_deref())
            .or(self.small.as_deref())
    }
}

/// Canonical per-platform URLs discovered during resolution. These are
/// verified links returned by the provider itself, not constructed
/// search URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUrls {
    pub spotify_track: Option<String>,
    pub spotify_album: Option<String>,
    pub spotify_artist: Option<String>,
    pub apple_music: Option<String>,
    pub deezer: Option<String>,
    pub youtube: Option<String>,
}

/// The single merged metadata record the system considers authoritative
/// for a given input. Built incrementally by the orchestrator merging
/// provider responses; title and artist are required for a track to count
/// as resolved, everything else is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTrack {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub album_id: Option<String>,
    pub artist_id: Option<String>,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    /// ISO date string as reported by the provider (may be year-only).
    pub release_date: Option<String>,
    pub artwork: Artwork,
    pub source_urls: SourceUrls,
}

impl CanonicalTrack {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            ..Default::default()
        }
    }

    /// A track is resolved once both title and artist are known.
    pub fn is_resolved(&self) -> bool {
        !self.title.trim().is_empty() && !self.artist.trim().is_empty()
    }
}

// ============================================================================
// Accuracy
// ============================================================================

/// Field-level explanation of how trustworthy a resolved match is.
/// Stateless, recomputed per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyBreakdown {
    pub isrc_match: bool,
    pub upc_match: bool,
    pub artist_similarity: u8,
    pub title_similarity: u8,
    pub album_match: bool,
}

// ============================================================================
// Platform links
// ============================================================================

/// Mapping from platform to a URL. Every platform key is always present:
/// either a verified deep link or a constructed search URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformLinkSet(pub BTreeMap<Platform, String>);

impl PlatformLinkSet {
    pub fn get(&self, platform: Platform) -> Option<&str> {
        self.0.get(&platform).map(String::as_str)
    }

    pub fn insert(&mut self, platform: Platform, url: impl Into<String>) {
        self.0.insert(platform, url.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How a pre-save platform entry should be rendered by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Release date is in the future; entry participates in pre-save flows.
    Presave,
    /// Release date has passed; entry is a plain streaming link.
    Streaming,
    /// No match could be confirmed on this platform.
    Unavailable,
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Presave => write!(f, "presave"),
            Self::Streaming => write!(f, "streaming"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// A single pre-save platform entry: a confirmed URL, a search fallback,
/// or an explicit unavailable placeholder with a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformLink {
    pub platform: Platform,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    /// True when the provider itself confirmed the match.
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ============================================================================
// Pre-save records
// ============================================================================

/// A stored pre-save entry awaiting (or past) its release date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresaveRecord {
    pub id: PresaveId,
    pub upc: String,
    pub artist: String,
    pub title: String,
    pub release_date: NaiveDate,
    pub is_released: bool,
    pub active: bool,
    pub spotify_track_url: Option<String>,
    pub spotify_album_url: Option<String>,
    pub spotify_artist_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PresaveRecord {
    pub fn new(
        upc: impl Into<String>,
        artist: impl Into<String>,
        title: impl Into<String>,
        release_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PresaveId::new(),
            upc: upc.into(),
            artist: artist.into(),
            title: title.into(),
            release_date,
            is_released: false,
            active: true,
            spotify_track_url: None,
            spotify_album_url: None,
            spotify_artist_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_all_covers_every_key_once() {
        let mut seen = std::collections::BTreeSet::new();
        for platform in Platform::ALL {
            assert!(seen.insert(platform), "duplicate platform {platform}");
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn platform_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Platform::AppleMusic).unwrap(),
            "\"apple_music\""
        );
        assert_eq!(Platform::AppleMusic.to_string(), "apple_music");
    }

    #[test]
    fn track_resolved_requires_title_and_artist() {
        let track = CanonicalTrack::new("One Dance", "Drake");
        assert!(track.is_resolved());

        let missing_artist = CanonicalTrack::new("One Dance", "  ");
        assert!(!missing_artist.is_resolved());

        assert!(!CanonicalTrack::default().is_resolved());
    }

    #[test]
    fn artwork_best_prefers_higher_resolution() {
        let artwork = Artwork {
            large: None,
            medium: Some("medium.jpg".into()),
            small: Some("small.jpg".into()),
        };
        assert_eq!(artwork.best(), Some("medium.jpg"));
        assert!(Artwork::default().is_empty());
    }

    #[test]
    fn link_kind_serializes_as_type_tag() {
        let link = PlatformLink {
            platform: Platform::Tidal,
            url: Some("https://listen.tidal.com/search?q=x".into()),
            kind: LinkKind::Presave,
            verified: false,
            reason: None,
        };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "presave");
        assert_eq!(json["platform"], "tidal");
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn presave_record_defaults_to_unreleased() {
        let record = PresaveRecord::new(
            "602567890123",
            "Drake",
            "One Dance",
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        );
        assert!(!record.is_released);
        assert!(record.active);
        assert!(record.spotify_track_url.is_none());
    }
}
