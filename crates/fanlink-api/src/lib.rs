pub mod handlers;

use axum::{routing::get, routing::post, Json, Router};
use fanlink_resolver::AppState;
use handlers::links::{
    generate_link, AccuracyBreakdownResponse, GenerateLinkRequest, GenerateLinkResponse,
    NotFoundResponse, __path_generate_link,
};
use handlers::metadata::{
    fetch_music_metadata, FetchMetadataRequest, FetchMetadataResponse, MetadataNotFoundResponse,
    MetadataWithPlatforms, __path_fetch_music_metadata,
};
use handlers::presaves::{
    auto_resolve_presaves, generate_presave_links, AutoResolveResponse,
    GeneratePresaveLinksRequest, GeneratePresaveLinksResponse, PlatformLinkResponse,
    SweepResultResponse, __path_auto_resolve_presaves, __path_generate_presave_links,
};
use handlers::{ArtworkResponse, ErrorResponse, SourceUrlsResponse, TrackMetadataResponse};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize, utoipa::ToSchema)]
struct HealthResponse {
    status: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        generate_link,
        fetch_music_metadata,
        generate_presave_links,
        auto_resolve_presaves,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            TrackMetadataResponse,
            ArtworkResponse,
            SourceUrlsResponse,
            GenerateLinkRequest,
            GenerateLinkResponse,
            AccuracyBreakdownResponse,
            NotFoundResponse,
            FetchMetadataRequest,
            FetchMetadataResponse,
            MetadataWithPlatforms,
            MetadataNotFoundResponse,
            GeneratePresaveLinksRequest,
            GeneratePresaveLinksResponse,
            PlatformLinkResponse,
            AutoResolveResponse,
            SweepResultResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "links", description = "Streaming link generation"),
        (name = "metadata", description = "Track metadata resolution"),
        (name = "presaves", description = "Pre-save link generation and sweeps")
    ),
    info(
        title = "Fanlink API",
        version = "0.1.0",
        description = "Music metadata resolution and smart-link generation service",
    )
)]
struct ApiDoc;

pub fn router(state: AppState) -> Router {
    info!(target: "api", "building router");

    let api_v1 = Router::new()
        .route("/generate-link", post(generate_link))
        .route("/fetch-music-metadata", post(fetch_music_metadata))
        .route("/generate-presave-links", post(generate_presave_links))
        .route("/auto-resolve-presaves", post(auto_resolve_presaves));

    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", api_v1)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", openapi))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
