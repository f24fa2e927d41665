// SPDX-License-Identifier: GPL-3.0-or-later

//! Cheap string similarity for artist/title comparison.
//!
//! This is deliberately not edit distance: comparisons are trimmed,
//! case-insensitive, NFC-normalized, and fall through exact match,
//! substring containment, then word overlap. The word-overlap branch is
//! order-insensitive and not symmetric; callers must not rely on
//! `similarity(a, b) == similarity(b, a)`.

use unicode_normalization::UnicodeNormalization;

fn normalize(input: &str) -> String {
    input.trim().nfc().collect::<String>().to_lowercase()
}

/// Similarity score in 0..=100.
///
/// Exact match scores 100, empty-vs-nonempty scores 0, substring
/// containment scores by length ratio, and anything else by the share
/// of words that appear (as substrings, either direction) in the other
/// string.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);

    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }

    if a.contains(&b) || b.contains(&a) {
        let len_a = a.chars().count() as f64;
        let len_b = b.chars().count() as f64;
        let (shorter, longer) = if len_a <= len_b {
            (len_a, len_b)
        } else {
            (len_b, len_a)
        };
        return (shorter / longer * 100.0).round() as u8;
    }

    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0;
    }

    let common = words_a
        .iter()
        .filter(|word_a| {
            words_b
                .iter()
                .any(|word_b| word_a.contains(word_b) || word_b.contains(*word_a))
        })
        .count() as f64;

    let denominator = words_a.len().max(words_b.len()) as f64;
    (common / denominator * 100.0).round() as u8
}
