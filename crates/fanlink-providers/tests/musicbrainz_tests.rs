use fanlink_providers::musicbrainz::{MusicBrainzClient, MusicBrainzError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_recording_search_by_isrc() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recording"))
        .and(query_param("query", "isrc:USRC17607839"))
        .and(query_param("fmt", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordings": [{
                "id": "f970f1e0-0f9b-4fd7-b8b0-9bb8ba1c0cf1",
                "title": "One Dance",
                "artist-credit": [{
                    "name": "Drake",
                    "artist": {"name": "Drake"}
                }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MusicBrainzClient::new(Some(server.uri()));
    let recording = client
        .search_recording_by_isrc("usrc17607839")
        .await
        .unwrap()
        .expect("recording found");

    assert_eq!(recording.title, "One Dance");
    assert_eq!(recording.artist, "Drake");
}

#[tokio::test]
async fn test_artist_credit_falls_back_to_artist_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recording"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordings": [{
                "id": "abc",
                "title": "Untitled",
                "artist-credit": [{
                    "artist": {"name": "Aphex Twin"}
                }]
            }]
        })))
        .mount(&server)
        .await;

    let client = MusicBrainzClient::new(Some(server.uri()));
    let recording = client
        .search_recording_by_isrc("GBAAA0000001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recording.artist, "Aphex Twin");
}

#[tokio::test]
async fn test_no_recordings_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recording"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"recordings": []})))
        .mount(&server)
        .await;

    let client = MusicBrainzClient::new(Some(server.uri()));
    let result = client.search_recording_by_isrc("GBAAA0000001").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_service_unavailable_maps_to_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recording"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = MusicBrainzClient::new(Some(server.uri()));
    let result = client.search_recording_by_isrc("GBAAA0000001").await;
    assert!(matches!(
        result.unwrap_err(),
        MusicBrainzError::RateLimitExceeded
    ));
}
