// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::{Duration, Utc};
use fanlink_domain::PresaveRecord;
use fanlink_providers::SpotifyClient;
use fanlink_resolver::{PresaveSweepService, SweepStatus};
use fanlink_store::{PresaveRepository, SqlitePresaveRepository};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn memory_repo() -> Arc<SqlitePresaveRepository> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite://:memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Arc::new(SqlitePresaveRepository::new(pool))
}

async fn spotify_against(server: &MockServer) -> Arc<SpotifyClient> {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;

    Arc::new(SpotifyClient::new_with_base_urls(
        Some("client-id".into()),
        Some("client-secret".into()),
        Some(server.uri()),
        Some(format!("{}/api/token", server.uri())),
    ))
}

fn mock_upc_album(upc: &str) -> Mock {
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
}

async fn mount_full_track(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/albums/album-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "album-1",
            "name": "Views",
            "external_urls": { "spotify": "https://open.spotify.com/album/album-1" },
            "tracks": { "items": [{ "id": "track-1", "name": "One Dance" }] }
        })))
        .mount(server)
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
        .mount(server)
        .await;
}

#[tokio::test]
async fn one_failing_record_does_not_stop_the_sweep() {
    let server = MockServer::start().await;
    let spotify = spotify_against(&server).await;
    let repo = memory_repo().await;

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let good = PresaveRecord::new("602567890123", "Drake", "One Dance", yesterday);
    let broken = PresaveRecord::new("602567890999", "Drake", "Other Song", yesterday);
    repo.insert(&good).await.expect("insert good");
    repo.insert(&broken).await.expect("insert broken");

    mock_upc_album("602567890123").mount(&server).await;
    mount_full_track(&server).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "upc:602567890999"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let sweep = PresaveSweepService::new(
        repo.clone(),
        spotify,
        std::time::Duration::from_millis(0),
    );
    let summary = sweep.run().await.expect("sweep runs");

    assert_eq!(summary.checked, 2);
    assert_eq!(summary.resolved, 1);

    let status_of = |id: &fanlink_domain::PresaveId| {
        summary
            .results
            .iter()
            .find(|result| result.id == id.to_string())
            .expect("result present")
    };
    assert_eq!(status_of(&good.id).status, SweepStatus::Resolved);
    let failed = status_of(&broken.id);
    assert_eq!(failed.status, SweepStatus::Error);
    assert!(failed.details.is_some());

    let stored = repo.get(good.id).await.expect("get").expect("record");
    assert!(stored.is_released);
    assert_eq!(
        stored.spotify_track_url.as_deref(),
        Some("https://open.spotify.com/track/track-1")
    );

    let untouched = repo.get(broken.id).await.expect("get").expect("record");
    assert!(!untouched.is_released);
}

#[tokio::test]
async fn unindexed_release_is_reported_not_found_and_left_pending() {
    let server = MockServer::start().await;
    let spotify = spotify_against(&server).await;
    let repo = memory_repo().await;

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let record = PresaveRecord::new("602567890123", "Drake", "One Dance", yesterday);
    repo.insert(&record).await.expect("insert");

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "albums": { "items": [] }
        })))
        .mount(&server)
        .await;

    let sweep = PresaveSweepService::new(
        repo.clone(),
        spotify,
        std::time::Duration::from_millis(0),
    );
    let summary = sweep.run().await.expect("sweep runs");

    assert_eq!(summary.checked, 1);
    assert_eq!(summary.resolved, 0);
    assert_eq!(summary.results[0].status, SweepStatus::NotFound);

    // Still pending; the next sweep will retry it.
    let stored = repo.get(record.id).await.expect("get").expect("record");
    assert!(!stored.is_released);
}
