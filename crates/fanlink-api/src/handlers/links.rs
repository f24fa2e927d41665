use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use fanlink_resolver::{generate_links, score, AppState, QuerySource, ResolveError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::{ErrorResponse, TrackMetadataResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateLinkRequest {
    /// Raw user input: UPC, ISRC, platform URL, or free text.
    pub input: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyBreakdownResponse {
    pub isrc_match: bool,
    pub upc_match: bool,
    pub artist_similarity: u8,
    pub title_similarity: u8,
    pub album_match: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateLinkResponse {
    pub success: bool,
    pub metadata: TrackMetadataResponse,
    pub streaming_links: BTreeMap<String, String>,
    pub accuracy_score: u8,
    pub accuracy_breakdown: AccuracyBreakdownResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotFoundResponse {
    pub error: String,
    pub suggestions: Vec<String>,
}

/// Resolve an input and build the full streaming-link set.
#[utoipa::path(
    post,
    path = "/api/v1/generate-link",
    request_body = GenerateLinkRequest,
    responses(
        (status = 200, description = "Links generated", body = GenerateLinkResponse),
        (status = 400, description = "Empty input", body = ErrorResponse),
        (status = 404, description = "No matching track", body = NotFoundResponse),
        (status = 500, description = "Provider credentials not configured", body = ErrorResponse)
    ),
    tag = "links"
)]
pub async fn generate_link(
    State(state): State<AppState>,
    Json(request): Json<GenerateLinkRequest>,
) -> impl IntoResponse {
    debug!(target: "api", input = %request.input, "generating link");

    if request.input.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Input is required".to_string(),
            }),
        )
            .into_response();
    }

    match state
        .resolver
        .resolve(&request.input, QuerySource::Spotify)
        .await
    {
        Ok(resolution) => {
            let scored = score(&resolution.track, &resolution.classification);
            let links = generate_links(&resolution.track);
            let streaming_links = links
                .0
                .into_iter()
                .map(|(platform, url)| (platform.as_str().to_string(), url))
                .collect();

            Json(GenerateLinkResponse {
                success: true,
                metadata: resolution.track.into(),
                streaming_links,
                accuracy_score: scored.score,
                accuracy_breakdown: AccuracyBreakdownResponse {
                    isrc_match: scored.breakdown.isrc_match,
                    upc_match: scored.breakdown.upc_match,
                    artist_similarity: scored.breakdown.artist_similarity,
                    title_similarity: scored.breakdown.title_similarity,
                    album_match: scored.breakdown.album_match,
                },
            })
            .into_response()
        }
        Err(ResolveError::NotFound {
            message,
            suggestions,
        }) => (
            StatusCode::NOT_FOUND,
            Json(NotFoundResponse {
                error: message,
                suggestions,
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
