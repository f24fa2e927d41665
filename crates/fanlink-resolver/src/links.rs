// SPDX-License-Identifier: GPL-3.0-or-later

//! Streaming-platform link generation.
//!
//! Only Spotify links can come back verified from resolution; every
//! other platform gets a constructed search URL so the output always
//! covers the full platform list.

use fanlink_domain::{CanonicalTrack, Platform, PlatformLinkSet};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

fn encode(text: &str) -> String {
    utf8_percent_encode(text, NON_ALPHANUMERIC).to_string()
}

/// Constructed search URL for a platform and an artist/title pair.
pub fn search_url(platform: Platform, artist: &str, title: &str) -> String {
    let query = format!("{artist} {title}");
    match platform {
        Platform::Spotify => format!("https://open.spotify.com/search/{}", encode(&query)),
        Platform::AppleMusic => format!("https://music.apple.com/search?term={}", encode(&query)),
        Platform::Youtube => format!("https://music.youtube.com/search?q={}", encode(&query)),
        Platform::Deezer => format!("https://www.deezer.com/search/{}", encode(&query)),
        Platform::Audiomack => format!("https://audiomack.com/search?q={}", encode(&query)),
        Platform::Boomplay => {
            format!("https://www.boomplay.com/search/default/{}", encode(&query))
        }
        Platform::Tidal => format!("https://listen.tidal.com/search?q={}", encode(&query)),
        Platform::Amazon => format!("https://music.amazon.com/search/{}", encode(&query)),
        Platform::Soundcloud => format!("https://soundcloud.com/search?q={}", encode(&query)),
        // Shazam joins the two halves with a dash rather than a space.
        Platform::Shazam => format!(
            "https://www.shazam.com/search/{}-{}",
            encode(artist),
            encode(title)
        ),
    }
}

/// Build the full platform link set for a resolved track: the verified
/// Spotify track URL when resolution produced one, search URLs for
/// everything else.
pub fn generate(track: &CanonicalTrack) -> PlatformLinkSet {
    let mut links = PlatformLinkSet::default();
    for platform in Platform::ALL {
        let url = match platform {
            Platform::Spotify => track
                .source_urls
                .spotify_track
                .clone()
                .unwrap_or_else(|| search_url(platform, &track.artist, &track.title)),
            _ => search_url(platform, &track.artist, &track.title),
        };
        links.insert(platform, url);
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_gets_a_link() {
        let track = CanonicalTrack::new("One Dance", "Drake");
        let links = generate(&track);
        assert_eq!(links.len(), Platform::ALL.len());
        for platform in Platform::ALL {
            assert!(links.get(platform).is_some(), "missing {platform}");
        }
    }

    #[test]
    fn verified_spotify_url_wins_over_search() {
        let mut track = CanonicalTrack::new("One Dance", "Drake");
        track.source_urls.spotify_track =
            Some("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC".into());
        let links = generate(&track);
        assert_eq!(
            links.get(Platform::Spotify),
            Some("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC")
        );
    }

    #[test]
    fn missing_spotify_url_falls_back_to_search() {
        let track = CanonicalTrack::new("One Dance", "Drake");
        let links = generate(&track);
        assert_eq!(
            links.get(Platform::Spotify),
            Some("https://open.spotify.com/search/Drake%20One%20Dance")
        );
    }

    #[test]
    fn search_urls_percent_encode_special_characters() {
        let url = search_url(Platform::Tidal, "AC/DC", "T.N.T.");
        assert!(!url.contains("AC/DC"), "{url}");
        assert!(url.starts_with("https://listen.tidal.com/search?q="));
    }

    #[test]
    fn shazam_joins_artist_and_title_with_dash() {
        let url = search_url(Platform::Shazam, "Drake", "One Dance");
        assert_eq!(url, "https://www.shazam.com/search/Drake-One%20Dance");
    }
}
