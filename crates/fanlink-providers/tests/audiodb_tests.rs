use fanlink_providers::audiodb::AudioDbClient;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_search_track_prefers_entry_with_thumbnail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/json/2/searchtrack.php"))
        .and(query_param("s", "Drake"))
        .and(query_param("t", "One Dance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "track": [
                {"strTrack": "One Dance (live)", "strArtist": "Drake", "strAlbum": null, "strTrackThumb": null},
                {"strTrack": "One Dance", "strArtist": "Drake", "strAlbum": "Views", "strTrackThumb": "https://example.org/thumb.jpg"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AudioDbClient::new(Some(server.uri()));
    let track = client
        .search_track("Drake", "One Dance")
        .await
        .unwrap()
        .expect("track found");
    assert_eq!(
        track.str_track_thumb.as_deref(),
        Some("https://example.org/thumb.jpg")
    );
}

#[tokio::test]
async fn test_null_track_field_means_no_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/json/2/searchtrack.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"track": null})))
        .mount(&server)
        .await;

    let client = AudioDbClient::new(Some(server.uri()));
    let result = client.search_track("Nobody", "Nothing").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_misses_are_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/json/2/searchtrack.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"track": null})))
        .expect(1)
        .mount(&server)
        .await;

    let client = AudioDbClient::new(Some(server.uri()));
    assert!(client.search_track("A", "B").await.unwrap().is_none());
    assert!(client.search_track("A", "B").await.unwrap().is_none());
}
