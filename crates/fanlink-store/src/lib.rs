// SPDX-License-Identifier: GPL-3.0-or-later

//! SQLite persistence for pre-save records.
//!
//! The resolution core itself persists nothing; this crate exists for the
//! auto-resolve sweep, which needs to find unreleased records whose date
//! has passed and flip them once a provider match is found.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fanlink_config::AppConfig;
use fanlink_domain::{PresaveId, PresaveRecord};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Initialize the SQLite pool and run migrations.
pub async fn init_pool(config: &AppConfig) -> Result<SqlitePool> {
    info!(target: "store", "initializing database");

    // Normalize the database URL for SQLite on Windows.
    let db_url = if config.database.url.starts_with("sqlite://")
        && !config.database.url.starts_with("sqlite://:memory:")
    {
        let db_path = config.database.url.trim_start_matches("sqlite://");
        let path = Path::new(db_path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let path_str = absolute_path.to_string_lossy().replace('\\', "/");

        format!("sqlite://{}?mode=rwc", path_str)
    } else {
        config.database.url.clone()
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.pool_max_size)
        .connect(&db_url)
        .await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;

    info!(target: "store", "database initialized");
    Ok(pool)
}

/// Repository abstraction so the sweep service and its tests are not
/// wired to SQLite.
#[async_trait]
pub trait PresaveRepository: Send + Sync {
    async fn insert(&self, record: &PresaveRecord) -> Result<(), StoreError>;

    async fn get(&self, id: PresaveId) -> Result<Option<PresaveRecord>, StoreError>;

    /// Active, not-yet-released records whose release date is on or
    /// before the given day.
    async fn due_for_release(&self, today: NaiveDate) -> Result<Vec<PresaveRecord>, StoreError>;

    /// Store resolved Spotify URLs and flip the record to released.
    async fn mark_released(
        &self,
        id: PresaveId,
        track_url: Option<&str>,
        album_url: Option<&str>,
        artist_url: Option<&str>,
    ) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqlitePresaveRepository {
    pool: SqlitePool,
}

impl SqlitePresaveRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PresaveRow {
    id: String,
    upc: String,
    artist: String,
    title: String,
    release_date: NaiveDate,
    is_released: bool,
    active: bool,
    spotify_track_url: Option<String>,
    spotify_album_url: Option<String>,
    spotify_artist_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PresaveRow {
    fn into_record(self) -> Result<PresaveRecord, StoreError> {
        let uuid = Uuid::parse_str(&self.id).map_err(|e| StoreError::Corrupt {
            id: self.id.clone(),
            reason: e.to_string(),
        })?;
        Ok(PresaveRecord {
            id: PresaveId::from_uuid(uuid),
            upc: self.upc,
            artist: self.artist,
            title: self.title,
            release_date: self.release_date,
            is_released: self.is_released,
            active: self.active,
            spotify_track_url: self.spotify_track_url,
            spotify_album_url: self.spotify_album_url,
            spotify_artist_url: self.spotify_artist_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl PresaveRepository for SqlitePresaveRepository {
    async fn insert(&self, record: &PresaveRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO presaves (
                id, upc, artist, title, release_date, is_released, active,
                spotify_track_url, spotify_album_url, spotify_artist_url,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.upc)
        .bind(&record.artist)
        .bind(&record.title)
        .bind(record.release_date)
        .bind(record.is_released)
        .bind(record.active)
        .bind(&record.spotify_track_url)
        .bind(&record.spotify_album_url)
        .bind(&record.spotify_artist_url)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: PresaveId) -> Result<Option<PresaveRecord>, StoreError> {
        let row: Option<PresaveRow> =
            sqlx::query_as("SELECT * FROM presaves WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(PresaveRow::into_record).transpose()
    }

    async fn due_for_release(&self, today: NaiveDate) -> Result<Vec<PresaveRecord>, StoreError> {
        let rows: Vec<PresaveRow> = sqlx::query_as(
            r#"
            SELECT * FROM presaves
            WHERE is_released = FALSE AND active = TRUE AND release_date <= ?
            ORDER BY release_date ASC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(PresaveRow::into_record).collect()
    }

    async fn mark_released(
        &self,
        id: PresaveId,
        track_url: Option<&str>,
        album_url: Option<&str>,
        artist_url: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE presaves SET
                is_released = TRUE,
                spotify_track_url = ?,
                spotify_album_url = ?,
                spotify_artist_url = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(track_url)
        .bind(album_url)
        .bind(artist_url)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
