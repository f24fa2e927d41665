// SPDX-License-Identifier: GPL-3.0-or-later

//! Accuracy scoring: a deterministic points rubric explaining how
//! trustworthy a resolved match is, weighted by the kind of input that
//! produced it.

use crate::similarity::similarity;
use fanlink_domain::{AccuracyBreakdown, CanonicalTrack, InputClassification};

/// The score plus its field-level explanation. Stateless; recomputed
/// per request from the resolved track and the classified input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMatch {
    pub score: u8,
    pub breakdown: AccuracyBreakdown,
}

/// Identifier-keyed matches are trusted as near-certain regardless of
/// accumulated points.
const IDENTIFIER_FLOOR: i32 = 90;

/// Score a resolved track against the input that produced it.
///
/// A direct platform URL is ground truth and scores 100 flat. Otherwise
/// points accumulate from identifier matches (ISRC/UPC), query text
/// similarity, and an album-presence bonus, clamped to 100.
pub fn score(track: &CanonicalTrack, input: &InputClassification) -> ScoredMatch {
    if let InputClassification::PlatformUrl { .. } = input {
        return ScoredMatch {
            score: 100,
            breakdown: AccuracyBreakdown {
                isrc_match: track.isrc.is_some(),
                upc_match: track.upc.is_some(),
                artist_similarity: 100,
                title_similarity: 100,
                album_match: true,
            },
        };
    }

    let mut breakdown = AccuracyBreakdown::default();
    let mut points: i32 = 0;

    // ISRC contribution, independent of the input kind: an exact match
    // against an ISRC input is worth more than mere presence, but a
    // track carrying an ISRC from any source still reports the match.
    let exact_isrc = matches!(
        input,
        InputClassification::Isrc { value }
            if track
                .isrc
                .as_deref()
                .is_some_and(|isrc| isrc.eq_ignore_ascii_case(value))
    );
    if exact_isrc {
        points += 40;
        breakdown.isrc_match = true;
    } else if track.isrc.is_some() {
        points += 20;
        breakdown.isrc_match = true;
    }

    if let InputClassification::Upc { .. } = input {
        // The orchestrator already performed a UPC-keyed provider
        // lookup; that is taken as sufficient evidence without
        // re-checking the provider's own UPC field.
        points += 40;
        breakdown.upc_match = true;
    }

    if (breakdown.isrc_match || breakdown.upc_match) && points < IDENTIFIER_FLOOR {
        points = IDENTIFIER_FLOOR;
    }

    if let InputClassification::Query { text } = input {
        match split_query(text) {
            Some((input_artist, input_title)) => {
                let artist_similarity = similarity(input_artist, &track.artist);
                let title_similarity = similarity(input_title, &track.title);
                breakdown.artist_similarity = artist_similarity;
                breakdown.title_similarity = title_similarity;
                points += weighted(artist_similarity, 20.0) + weighted(title_similarity, 20.0);
            }
            None => {
                let combined = similarity(text, &format!("{} {}", track.artist, track.title));
                breakdown.artist_similarity = combined;
                breakdown.title_similarity = combined;
                points += weighted(combined, 40.0);
            }
        }
    }

    if track.album.as_deref().is_some_and(|album| !album.is_empty()) {
        points += 20;
        breakdown.album_match = true;
    }

    ScoredMatch {
        score: points.clamp(0, 100) as u8,
        breakdown,
    }
}

fn weighted(similarity: u8, weight: f64) -> i32 {
    (f64::from(similarity) / 100.0 * weight).round() as i32
}

/// Split a free-text query on its first hyphen or en-dash separator
/// into artist/title halves.
fn split_query(text: &str) -> Option<(&str, &str)> {
    for separator in [" - ", " \u{2013} "] {
        if let Some((artist, title)) = text.split_once(separator) {
            let artist = artist.trim();
            let title = title.trim();
            if !artist.is_empty() && !title.is_empty() {
                return Some((artist, title));
            }
        }
    }
    None
}
