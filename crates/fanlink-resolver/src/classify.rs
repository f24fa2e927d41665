// SPDX-License-Identifier: GPL-3.0-or-later

//! Input classification: decide whether a raw string is a UPC, an ISRC,
//! a known streaming-platform URL, or a free-text query.
//!
//! Classification is total. Anything unrecognized, including a platform
//! URL whose resource id cannot be extracted, falls through to a query.

use fanlink_domain::{InputClassification, ResourceType, UrlPlatform};
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref ISRC_REGEX: Regex =
        Regex::new(r"(?i)^[A-Z]{2}[A-Z0-9]{3}\d{7}$").expect("valid ISRC regex");
}

/// UPC digit-length bounds. The two pipelines historically accepted
/// different lengths, so the bound is a parameter instead of a regex
/// baked into the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcBounds {
    pub min_digits: usize,
    pub max_digits: usize,
}

impl UpcBounds {
    /// Bounds used by the generate-link pipeline.
    pub const GENERATE_LINK: UpcBounds = UpcBounds {
        min_digits: 12,
        max_digits: 13,
    };

    /// Bounds used by the pre-save pipeline.
    pub const PRESAVE: UpcBounds = UpcBounds {
        min_digits: 12,
        max_digits: 14,
    };

    pub fn new(min_digits: usize, max_digits: usize) -> Self {
        Self {
            min_digits,
            max_digits,
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        (self.min_digits..=self.max_digits).contains(&candidate.len())
            && candidate.chars().all(|c| c.is_ascii_digit())
    }
}

/// Classify a raw input. UPC wins over ISRC wins over platform URL;
/// everything else is a query, used verbatim as a search term.
pub fn classify(raw: &str, upc_bounds: UpcBounds) -> InputClassification {
    let trimmed = raw.trim();

    if upc_bounds.matches(trimmed) {
        return InputClassification::Upc {
            value: trimmed.to_string(),
        };
    }

    if ISRC_REGEX.is_match(trimmed) {
        return InputClassification::Isrc {
            value: trimmed.to_uppercase(),
        };
    }

    if let Some(classification) = classify_url(trimmed) {
        return classification;
    }

    InputClassification::Query {
        text: trimmed.to_string(),
    }
}

fn classify_url(input: &str) -> Option<InputClassification> {
    let lower = input.to_lowercase();

    let platform = if lower.contains("spotify.com") {
        UrlPlatform::Spotify
    } else if lower.contains("music.apple.com") || lower.contains("itunes.apple.com") {
        UrlPlatform::AppleMusic
    } else if lower.contains("deezer.com") {
        UrlPlatform::Deezer
    } else if lower.contains("youtube.com") || lower.contains("youtu.be") {
        UrlPlatform::Youtube
    } else {
        return None;
    };

    let url = parse_lenient(input)?;
    let segments: Vec<String> = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    let (resource_type, resource_id) = match platform {
        UrlPlatform::Spotify => extract_spotify(&segments)?,
        UrlPlatform::AppleMusic => extract_apple(&url, &segments)?,
        UrlPlatform::Deezer => extract_deezer(&segments)?,
        UrlPlatform::Youtube => extract_youtube(&url, &segments)?,
    };

    Some(InputClassification::PlatformUrl {
        platform,
        resource_type,
        resource_id,
    })
}

/// Accept URLs pasted without a scheme.
fn parse_lenient(input: &str) -> Option<Url> {
    Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{input}")))
        .ok()
}

/// Spotify paths look like `/track/<id>`, possibly behind a locale
/// segment such as `/intl-de/`.
fn extract_spotify(segments: &[String]) -> Option<(ResourceType, String)> {
    for (index, segment) in segments.iter().enumerate() {
        let resource_type = match segment.as_str() {
            "track" => ResourceType::Track,
            "album" => ResourceType::Album,
            "artist" => ResourceType::Artist,
            _ => continue,
        };
        let id = segments.get(index + 1)?;
        if !id.is_empty() {
            return Some((resource_type, id.clone()));
        }
    }
    None
}

/// Apple Music song links carry the numeric song id in the `i` query
/// parameter; album links end in the numeric collection id after the
/// slug.
fn extract_apple(url: &Url, segments: &[String]) -> Option<(ResourceType, String)> {
    if let Some((_, song_id)) = url.query_pairs().find(|(key, _)| key == "i") {
        if song_id.chars().all(|c| c.is_ascii_digit()) && !song_id.is_empty() {
            return Some((ResourceType::Song, song_id.into_owned()));
        }
    }

    let marker = segments
        .iter()
        .position(|segment| segment == "album" || segment == "song")?;
    let resource_type = if segments[marker] == "song" {
        ResourceType::Song
    } else {
        ResourceType::Album
    };

    segments[marker + 1..]
        .iter()
        .find(|segment| segment.chars().all(|c| c.is_ascii_digit()) && !segment.is_empty())
        .map(|id| (resource_type, id.clone()))
}

/// Deezer paths are `/<locale?>/track/<numeric id>`.
fn extract_deezer(segments: &[String]) -> Option<(ResourceType, String)> {
    for (index, segment) in segments.iter().enumerate() {
        let resource_type = match segment.as_str() {
            "track" => ResourceType::Track,
            "album" => ResourceType::Album,
            "artist" => ResourceType::Artist,
            _ => continue,
        };
        let id = segments.get(index + 1)?;
        if id.chars().all(|c| c.is_ascii_digit()) && !id.is_empty() {
            return Some((resource_type, id.clone()));
        }
    }
    None
}

/// YouTube: the `v` query parameter on youtube.com, the bare path
/// segment on youtu.be.
fn extract_youtube(url: &Url, segments: &[String]) -> Option<(ResourceType, String)> {
    if let Some((_, video_id)) = url.query_pairs().find(|(key, _)| key == "v") {
        if !video_id.is_empty() {
            return Some((ResourceType::Video, video_id.into_owned()));
        }
    }

    segments
        .iter()
        .find(|segment| *segment != "watch" && *segment != "shorts" && *segment != "embed")
        .map(|id| (ResourceType::Video, id.clone()))
}
