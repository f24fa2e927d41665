// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_max_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://fanlink.db".to_string(),
            pool_max_size: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5160,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub max_concurrent_jobs: usize,
    /// Interval between auto-resolve sweeps, in seconds.
    pub presave_sweep_interval_secs: u64,
    /// Fixed delay between per-record provider lookups during a sweep,
    /// in milliseconds. Purely rate-limit courtesy, not correctness.
    pub presave_sweep_delay_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            presave_sweep_interval_secs: 15 * 60,
            presave_sweep_delay_ms: 1_000,
        }
    }
}

/// Spotify client-credentials configuration. The id/secret pair is
/// required for any Spotify-dependent lookup; everything else has
/// production defaults and is overridable for tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: Option<String>,
    pub token_url: Option<String>,
    pub oembed_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub itunes_base_url: Option<String>,
    pub deezer_base_url: Option<String>,
    pub musicbrainz_base_url: Option<String>,
    pub audiodb_base_url: Option<String>,
}

/// UPC digit-length bounds accepted by the input classifier. The two
/// historical call sites disagreed (12-13 vs 12-14), so both are
/// configured explicitly instead of hard-coding one regex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub link_upc_min_digits: usize,
    pub link_upc_max_digits: usize,
    pub presave_upc_min_digits: usize,
    pub presave_upc_max_digits: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            link_upc_min_digits: 12,
            link_upc_max_digits: 13,
            presave_upc_min_digits: 12,
            presave_upc_max_digits: 14,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub telemetry: TelemetryConfig,
    pub scheduler: SchedulerConfig,
    pub spotify: SpotifyConfig,
    pub providers: ProvidersConfig,
    pub classifier: ClassifierConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: FANLINK_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("FANLINK_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
