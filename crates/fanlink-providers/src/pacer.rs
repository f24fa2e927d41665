// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Enforces a minimum interval between outbound requests to a provider.
///
/// MusicBrainz allows 1 request per second for non-commercial use; other
/// catalogs have softer limits but the same shape. Callers hold the
/// internal lock for the duration of the wait, which serializes paced
/// requests by construction.
#[derive(Debug, Clone)]
pub struct Pacer {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Pacer with MusicBrainz defaults (1 request per second).
    pub fn musicbrainz_default() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Wait until the next request is allowed, then stamp the clock.
    pub async fn pause(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_instant) = *last {
            let elapsed = last_instant.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!(target: "providers", "rate limiting: waiting {:?}", wait);
                sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_is_immediate() {
        let pacer = Pacer::new(Duration::from_millis(100));
        let start = Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn consecutive_requests_are_spaced() {
        let pacer = Pacer::new(Duration::from_millis(80));
        let start = Instant::now();

        pacer.pause().await;
        pacer.pause().await;
        pacer.pause().await;

        // Two intervals between three requests.
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(160),
            "expected >= 160ms, got {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn clones_share_the_same_clock() {
        let pacer = Pacer::new(Duration::from_millis(80));
        let other = pacer.clone();

        let start = Instant::now();
        pacer.pause().await;
        other.pause().await;

        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
