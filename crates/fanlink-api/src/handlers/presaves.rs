use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::NaiveDate;
use fanlink_domain::PlatformLink;
use fanlink_resolver::{AppState, ResolveError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use super::ErrorResponse;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePresaveLinksRequest {
    pub upc: String,
    pub artist: String,
    pub title: String,
    /// ISO date, `YYYY-MM-DD`.
    pub release_date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformLinkResponse {
    pub platform: String,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<PlatformLink> for PlatformLinkResponse {
    fn from(link: PlatformLink) -> Self {
        Self {
            platform: link.platform.as_str().to_string(),
            url: link.url,
            kind: link.kind.to_string(),
            verified: link.verified,
            reason: link.reason,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePresaveLinksResponse {
    pub success: bool,
    pub is_released: bool,
    pub release_date: String,
    pub artist: String,
    pub title: String,
    pub upc: String,
    pub platforms: Vec<PlatformLinkResponse>,
}

/// Build the pre-save link set for a release. Validation failures are
/// rejected before any provider call is made.
#[utoipa::path(
    post,
    path = "/api/v1/generate-presave-links",
    request_body = GeneratePresaveLinksRequest,
    responses(
        (status = 200, description = "Pre-save links generated", body = GeneratePresaveLinksResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 500, description = "Provider credentials not configured", body = ErrorResponse)
    ),
    tag = "presaves"
)]
pub async fn generate_presave_links(
    State(state): State<AppState>,
    Json(request): Json<GeneratePresaveLinksRequest>,
) -> impl IntoResponse {
    debug!(target: "api", upc = %request.upc, "generating pre-save links");

    let upc = request.upc.trim();
    let artist = request.artist.trim();
    let title = request.title.trim();

    if artist.is_empty() || title.is_empty() {
        return bad_request("artist and title are required");
    }
    if !state.presave_upc_bounds.matches(upc) {
        return bad_request(&format!(
            "upc must be {}-{} digits",
            state.presave_upc_bounds.min_digits, state.presave_upc_bounds.max_digits
        ));
    }
    let release_date = match NaiveDate::parse_from_str(request.release_date.trim(), "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => return bad_request("releaseDate must be an ISO date (YYYY-MM-DD)"),
    };

    match state
        .presave_links
        .generate(upc, artist, title, release_date)
        .await
    {
        Ok(links) => Json(GeneratePresaveLinksResponse {
            success: true,
            is_released: links.is_released,
            release_date: release_date.to_string(),
            artist: artist.to_string(),
            title: title.to_string(),
            upc: upc.to_string(),
            platforms: links.links.into_iter().map(Into::into).collect(),
        })
        .into_response(),
        Err(ResolveError::Configuration(message)) => {
            error!(target: "api", %message, "pre-save generation unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: message }),
            )
                .into_response()
        }
        Err(ResolveError::NotFound { message, .. }) => {
            // The generator reports per-platform misses inline, so a
            // NotFound here is unexpected; treat it as a server error.
            error!(target: "api", %message, "unexpected pre-save resolution failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: message }),
            )
                .into_response()
        }
    }
}

fn bad_request(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResultResponse {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AutoResolveResponse {
    pub success: bool,
    pub checked: usize,
    pub resolved: usize,
    pub results: Vec<SweepResultResponse>,
}

/// Manually trigger one pre-save sweep over all due records.
#[utoipa::path(
    post,
    path = "/api/v1/auto-resolve-presaves",
    responses(
        (status = 200, description = "Sweep completed", body = AutoResolveResponse),
        (status = 500, description = "Sweep could not run", body = ErrorResponse)
    ),
    tag = "presaves"
)]
pub async fn auto_resolve_presaves(State(state): State<AppState>) -> impl IntoResponse {
    debug!(target: "api", "manual pre-save sweep requested");

    match state.sweep.run().await {
        Ok(summary) => Json(AutoResolveResponse {
            success: true,
            checked: summary.checked,
            resolved: summary.resolved,
            results: summary
                .results
                .into_iter()
                .map(|result| SweepResultResponse {
                    id: result.id,
                    status: match result.status {
                        fanlink_resolver::SweepStatus::Resolved => "resolved".to_string(),
                        fanlink_resolver::SweepStatus::NotFound => "not_found".to_string(),
                        fanlink_resolver::SweepStatus::Error => "error".to_string(),
                    },
                    details: result.details,
                })
                .collect(),
        })
        .into_response(),
        Err(error) => {
            error!(target: "api", %error, "pre-save sweep failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}
