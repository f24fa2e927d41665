// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP clients for the external catalogs the resolver consults.
//!
//! Every client exposes typed lookups returning `Result<Option<..>>` or
//! `Result<Vec<..>>`: a provider that answers but has no match yields an
//! empty value, while transport and API failures surface as the client's
//! own error enum. The orchestrator decides what a failure means; no
//! client retries or falls back on its own.

pub mod audiodb;
pub mod deezer;
pub mod itunes;
pub mod musicbrainz;
pub mod oembed;
pub mod pacer;
pub mod spotify;

pub use audiodb::{AudioDbClient, AudioDbError, AudioDbTrack};
pub use deezer::{DeezerClient, DeezerError, DeezerTrack};
pub use itunes::{ItunesClient, ItunesError, ItunesTrack};
pub use musicbrainz::{MusicBrainzClient, MusicBrainzError, RecordingMatch};
pub use oembed::{OembedError, OembedTrack, SpotifyOembedClient};
pub use spotify::{SpotifyAlbum, SpotifyClient, SpotifyError, SpotifyTrack, TokenCache};
