// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolution core: input classification, provider orchestration,
//! accuracy scoring, platform link generation, the release-date gate and
//! the pre-save sweep.

pub mod classify;
pub mod links;
pub mod presave;
pub mod resolver;
pub mod scoring;
pub mod similarity;
pub mod sweep;

use fanlink_config::AppConfig;
use fanlink_providers::{DeezerClient, ItunesClient, SpotifyClient};
use fanlink_store::PresaveRepository;
use std::sync::Arc;
use tokio::time::Duration;

pub use classify::{classify, UpcBounds};
pub use links::generate as generate_links;
pub use presave::{is_released, PresaveLinkGenerator, PresaveLinks};
pub use resolver::{QuerySource, Resolution, ResolveError, TrackResolver};
pub use scoring::{score, ScoredMatch};
pub use sweep::{PresaveSweepService, SweepStatus, SweepSummary};

/// Shared application state handed to the HTTP layer and the scheduler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<TrackResolver>,
    pub presave_links: Arc<PresaveLinkGenerator>,
    pub sweep: Arc<PresaveSweepService>,
    /// UPC bounds for the pre-save endpoints, wider than the
    /// generate-link ones.
    pub presave_upc_bounds: UpcBounds,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn PresaveRepository>) -> Self {
        let spotify = Arc::new(SpotifyClient::new_with_base_urls(
            config.spotify.client_id.clone(),
            config.spotify.client_secret.clone(),
            config.spotify.api_base_url.clone(),
            config.spotify.token_url.clone(),
        ));
        let itunes = Arc::new(ItunesClient::new(config.providers.itunes_base_url.clone()));
        let deezer = Arc::new(DeezerClient::new(config.providers.deezer_base_url.clone()));

        let resolver = Arc::new(TrackResolver::new(
            Arc::clone(&spotify),
            Arc::clone(&itunes),
            Arc::clone(&deezer),
            &config,
        ));
        let presave_links = Arc::new(PresaveLinkGenerator::new(
            Arc::clone(&spotify),
            Arc::clone(&itunes),
            Arc::clone(&deezer),
        ));
        let sweep = Arc::new(PresaveSweepService::new(
            store,
            spotify,
            Duration::from_millis(config.scheduler.presave_sweep_delay_ms),
        ));

        let presave_upc_bounds = UpcBounds::new(
            config.classifier.presave_upc_min_digits,
            config.classifier.presave_upc_max_digits,
        );

        Self {
            config: Arc::new(config),
            resolver,
            presave_links,
            sweep,
            presave_upc_bounds,
        }
    }
}
