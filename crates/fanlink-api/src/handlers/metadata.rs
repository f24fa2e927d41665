use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use fanlink_resolver::{classify, generate_links, AppState, QuerySource, ResolveError, UpcBounds};
use fanlink_domain::{InputClassification, UrlPlatform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::{ErrorResponse, TrackMetadataResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct FetchMetadataRequest {
    pub input: String,
    /// Optional declared type hint; currently informational only.
    #[serde(rename = "type")]
    pub type_hint: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FetchMetadataResponse {
    pub success: bool,
    pub metadata: MetadataWithPlatforms,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetadataWithPlatforms {
    #[serde(flatten)]
    pub track: TrackMetadataResponse,
    pub platforms: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetadataNotFoundResponse {
    pub error: String,
    pub metadata: Option<MetadataWithPlatforms>,
}

/// Resolve an input to metadata plus a platform link map. Free-text
/// queries go to iTunes in this flow; YouTube URLs are passed through
/// without catalog resolution.
#[utoipa::path(
    post,
    path = "/api/v1/fetch-music-metadata",
    request_body = FetchMetadataRequest,
    responses(
        (status = 200, description = "Metadata resolved", body = FetchMetadataResponse),
        (status = 400, description = "Empty input", body = ErrorResponse),
        (status = 404, description = "No matching track", body = MetadataNotFoundResponse),
        (status = 500, description = "Provider credentials not configured", body = ErrorResponse)
    ),
    tag = "metadata"
)]
pub async fn fetch_music_metadata(
    State(state): State<AppState>,
    Json(request): Json<FetchMetadataRequest>,
) -> impl IntoResponse {
    debug!(
        target: "api",
        input = %request.input,
        type_hint = ?request.type_hint,
        "fetching metadata"
    );

    if request.input.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Input is required".to_string(),
            }),
        )
            .into_response();
    }

    // YouTube carries no catalog metadata; the video id and URL are
    // returned as-is so the caller can store them directly.
    if let InputClassification::PlatformUrl {
        platform: UrlPlatform::Youtube,
        resource_id,
        ..
    } = classify(&request.input, UpcBounds::GENERATE_LINK)
    {
        let url = format!("https://www.youtube.com/watch?v={resource_id}");
        let mut track = fanlink_domain::CanonicalTrack::default();
        track.source_urls.youtube = Some(url.clone());
        let mut platforms = BTreeMap::new();
        platforms.insert("youtube".to_string(), url);

        return Json(FetchMetadataResponse {
            success: true,
            metadata: MetadataWithPlatforms {
                track: track.into(),
                platforms,
            },
        })
        .into_response();
    }

    match state
        .resolver
        .resolve(&request.input, QuerySource::Itunes)
        .await
    {
        Ok(resolution) => {
            let platforms = generate_links(&resolution.track)
                .0
                .into_iter()
                .map(|(platform, url)| (platform.as_str().to_string(), url))
                .collect();

            Json(FetchMetadataResponse {
                success: true,
                metadata: MetadataWithPlatforms {
                    track: resolution.track.into(),
                    platforms,
                },
            })
            .into_response()
        }
        Err(ResolveError::NotFound { message, .. }) => (
            StatusCode::NOT_FOUND,
            Json(MetadataNotFoundResponse {
                error: message,
                metadata: None,
            }),
        )
            .into_response(),
        Err(ResolveError::Configuration(message)) => {
            error!(target: "api", %message, "resolution unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: message }),
            )
                .into_response()
        }
    }
}
