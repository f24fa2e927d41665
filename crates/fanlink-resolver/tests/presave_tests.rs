// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::{Duration, Utc};
use fanlink_domain::{LinkKind, Platform};
use fanlink_providers::{DeezerClient, ItunesClient, SpotifyClient};
use fanlink_resolver::PresaveLinkGenerator;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Mocks {
    spotify: MockServer,
    itunes: MockServer,
    deezer: MockServer,
}

async fn setup() -> (Mocks, PresaveLinkGenerator) {
    let mocks = Mocks {
        spotify: MockServer::start().await,
        itunes: MockServer::start().await,
        deezer: MockServer::start().await,
    };

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(&mocks.spotify)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .with_priority(200)
        .mount(&mocks.deezer)
        .await;

    let spotify = Arc::new(SpotifyClient::new_with_base_urls(
        Some("client-id".into()),
        Some("client-secret".into()),
        Some(mocks.spotify.uri()),
        Some(format!("{}/api/token", mocks.spotify.uri())),
    ));
    let itunes = Arc::new(ItunesClient::new(Some(mocks.itunes.uri())));
    let deezer = Arc::new(DeezerClient::new(Some(mocks.deezer.uri())));
    let generator = PresaveLinkGenerator::new(spotify, itunes, deezer);

    (mocks, generator)
}

fn mock_empty_spotify_upc(upc: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", format!("upc:{upc}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "albums": { "items": [] }
        })))
}

fn mock_empty_itunes_upc(upc: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("upc", upc))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
}

#[tokio::test]
async fn unreleased_upc_yields_presave_search_links_and_reasons() {
    let (mocks, generator) = setup().await;
    let upc = "00602567890123";

    mock_empty_spotify_upc(upc).mount(&mocks.spotify).await;
    mock_empty_itunes_upc(upc).mount(&mocks.itunes).await;

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let links = generator
        .generate(upc, "Drake", "One Dance", tomorrow)
        .await
        .expect("generates");

    assert!(!links.is_released);
    assert_eq!(links.links.len(), Platform::ALL.len());

    let by_platform = |platform| {
        links
            .links
            .iter()
            .find(|link| link.platform == platform)
            .expect("platform entry present")
    };

    // No catalog hit yet: the lookup platforms are unavailable with a
    // reason, the rest carry pre-save search links.
    for platform in [Platform::Spotify, Platform::AppleMusic, Platform::Deezer] {
        let link = by_platform(platform);
        assert_eq!(link.kind, LinkKind::Unavailable, "{platform}");
        assert!(link.reason.is_some(), "{platform}");
    }
    let tidal = by_platform(Platform::Tidal);
    assert_eq!(tidal.kind, LinkKind::Presave);
    assert!(tidal.url.is_some());
    assert!(!tidal.verified);
}

#[tokio::test]
async fn released_upc_with_spotify_hit_yields_verified_streaming_link() {
    let (mocks, generator) = setup().await;
    let upc = "00602567890123";

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", format!("upc:{upc}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "albums": { "items": [{
                "id": "album-1",
                "name": "Views",
                "external_urls": { "spotify": "https://open.spotify.com/album/album-1" }
            }] }
        })))
        .mount(&mocks.spotify)
        .await;
    Mock::given(method("GET"))
        .and(path("/albums/album-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "album-1",
            "name": "Views",
            "external_urls": { "spotify": "https://open.spotify.com/album/album-1" },
            "tracks": { "items": [{ "id": "track-1", "name": "One Dance" }] }
        })))
        .mount(&mocks.spotify)
        .await;
    Mock::given(method("GET"))
        .and(path("/tracks/track-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "track-1",
            "name": "One Dance",
            "artists": [{
                "id": "artist-1",
                "name": "Drake",
                "external_urls": { "spotify": "https://open.spotify.com/artist/artist-1" }
            }],
            "external_urls": { "spotify": "https://open.spotify.com/track/track-1" }
        })))
        .mount(&mocks.spotify)
        .await;
    mock_empty_itunes_upc(upc).mount(&mocks.itunes).await;

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let links = generator
        .generate(upc, "Drake", "One Dance", yesterday)
        .await
        .expect("generates");

    assert!(links.is_released);
    assert_eq!(
        links.spotify_urls.track.as_deref(),
        Some("https://open.spotify.com/track/track-1")
    );
    assert_eq!(
        links.spotify_urls.artist.as_deref(),
        Some("https://open.spotify.com/artist/artist-1")
    );

    let spotify = links
        .links
        .iter()
        .find(|link| link.platform == Platform::Spotify)
        .expect("spotify entry");
    assert_eq!(spotify.kind, LinkKind::Streaming);
    assert!(spotify.verified);
    assert_eq!(
        spotify.url.as_deref(),
        Some("https://open.spotify.com/track/track-1")
    );
}

#[tokio::test]
async fn itunes_hit_for_a_different_release_is_rejected() {
    let (mocks, generator) = setup().await;
    let upc = "00602567890123";

    mock_empty_spotify_upc(upc).mount(&mocks.spotify).await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("upc", upc))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "trackName": "Completely Different Song",
                "artistName": "Somebody Else",
                "trackViewUrl": "https://music.apple.com/us/album/x/1?i=2"
            }]
        })))
        .expect(1)
        .mount(&mocks.itunes)
        .await;

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let links = generator
        .generate(upc, "Drake", "One Dance", tomorrow)
        .await
        .expect("generates");

    let apple = links
        .links
        .iter()
        .find(|link| link.platform == Platform::AppleMusic)
        .expect("apple entry");
    assert_eq!(apple.kind, LinkKind::Unavailable);
    assert!(apple.url.is_none());
}

#[tokio::test]
async fn deezer_falls_back_from_upc_to_artist_title_query() {
    let (mocks, generator) = setup().await;
    let upc = "00602567890123";

    mock_empty_spotify_upc(upc).mount(&mocks.spotify).await;
    mock_empty_itunes_upc(upc).mount(&mocks.itunes).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Drake One Dance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 3135556,
                "title": "One Dance",
                "link": "https://www.deezer.com/track/3135556",
                "artist": { "id": 27, "name": "Drake" }
            }]
        })))
        .expect(1)
        .mount(&mocks.deezer)
        .await;

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let links = generator
        .generate(upc, "Drake", "One Dance", tomorrow)
        .await
        .expect("generates");

    let deezer = links
        .links
        .iter()
        .find(|link| link.platform == Platform::Deezer)
        .expect("deezer entry");
    assert!(deezer.verified);
    assert_eq!(
        deezer.url.as_deref(),
        Some("https://www.deezer.com/track/3135556")
    );
    assert_eq!(deezer.kind, LinkKind::Presave);
}
