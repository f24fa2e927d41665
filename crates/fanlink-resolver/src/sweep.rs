// SPDX-License-Identifier: GPL-3.0-or-later

//! Pre-save sweep: find active records whose release date has passed,
//! attempt Spotify resolution by UPC, and flip the ones that resolve.
//!
//! One record failing must never stop the rest; failures are reported
//! per record and the sweep as a whole still succeeds.

use chrono::Utc;
use fanlink_providers::SpotifyClient;
use fanlink_store::PresaveRepository;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{info, instrument, warn};

/// Outcome of one record within a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStatus {
    Resolved,
    NotFound,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub id: String,
    pub status: SweepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub checked: usize,
    pub resolved: usize,
    pub results: Vec<SweepResult>,
}

pub struct PresaveSweepService {
    store: Arc<dyn PresaveRepository>,
    spotify: Arc<SpotifyClient>,
    /// Pause between records, purely to respect provider rate limits.
    record_delay: Duration,
}

impl PresaveSweepService {
    pub fn new(
        store: Arc<dyn PresaveRepository>,
        spotify: Arc<SpotifyClient>,
        record_delay: Duration,
    ) -> Self {
        Self {
            store,
            spotify,
            record_delay,
        }
    }

    /// Run one sweep over every due record.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<SweepSummary, fanlink_store::StoreError> {
        let today = Utc::now().date_naive();
        let due = self.store.due_for_release(today).await?;

        info!(target: "sweep", due = due.len(), "starting pre-save sweep");

        let mut results = Vec::with_capacity(due.len());
        let mut resolved = 0;

        for (index, record) in due.iter().enumerate() {
            if index > 0 {
                sleep(self.record_delay).await;
            }

            let result = self.resolve_record(record).await;
            if result.status == SweepStatus::Resolved {
                resolved += 1;
            }
            results.push(result);
        }

        info!(
            target: "sweep",
            checked = due.len(),
            resolved,
            "pre-save sweep finished"
        );

        Ok(SweepSummary {
            checked: due.len(),
            resolved,
            results,
        })
    }

    async fn resolve_record(&self, record: &fanlink_domain::PresaveRecord) -> SweepResult {
        let id = record.id.to_string();

        let track = match self.spotify.find_track_by_upc(&record.upc).await {
            Ok(track) => track,
            Err(error) => {
                warn!(target: "sweep", id = %id, %error, "resolution failed");
                return SweepResult {
                    id,
                    status: SweepStatus::Error,
                    details: Some(error.to_string()),
                };
            }
        };

        let Some(track) = track else {
            return SweepResult {
                id,
                status: SweepStatus::NotFound,
                details: Some(format!("no Spotify release for UPC {}", record.upc)),
            };
        };

        let track_url = track.external_urls.spotify.clone();
        let album_url = track
            .album
            .as_ref()
            .and_then(|album| album.external_urls.spotify.clone());
        let artist_url = track
            .primary_artist()
            .and_then(|artist| artist.external_urls.spotify.clone());

        match self
            .store
            .mark_released(
                record.id,
                track_url.as_deref(),
                album_url.as_deref(),
                artist_url.as_deref(),
            )
            .await
        {
            Ok(()) => SweepResult {
                id,
                status: SweepStatus::Resolved,
                details: None,
            },
            Err(error) => {
                warn!(target: "sweep", id = %id, %error, "failed to mark record released");
                SweepResult {
                    id,
                    status: SweepStatus::Error,
                    details: Some(error.to_string()),
                }
            }
        }
    }
}
