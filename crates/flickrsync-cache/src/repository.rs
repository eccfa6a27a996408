//! SQLite implementation of IRecordStore
//!
//! This module provides the concrete SQLite-based implementation of the
//! record store port defined in flickrsync-core.
//!
//! ## Type Mapping
//!
//! | Domain Type | SQL Column         | Strategy                                   |
//! |-------------|--------------------|--------------------------------------------|
//! | PhotoPath   | `photos.path`      | String via `.as_str()` / `PhotoPath::new()` |
//! | PhotoId     | `photos.photo_id`  | String via `.as_str()` / `PhotoId::new()`   |
//! | AlbumId     | `*.album_id`       | String via `.as_str()` / `AlbumId::new()`   |

use std::collections::BTreeMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use flickrsync_core::domain::{AlbumId, PhotoId, PhotoPath, PhotoRecord};
use flickrsync_core::ports::IRecordStore;

use crate::CacheError;

/// SQLite-based implementation of the record store port
///
/// Uniqueness of photo paths, photo ids, album names and album ids is
/// enforced by the schema, so duplicate inserts surface as query errors.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn photo_path_from_row(row: &SqliteRow) -> Result<PhotoPath, CacheError> {
    let raw: String = row.get("path");
    PhotoPath::new(raw).map_err(|e| CacheError::InvalidRecord(e.to_string()))
}

fn photo_id_from_row(row: &SqliteRow) -> Result<PhotoId, CacheError> {
    let raw: String = row.get("photo_id");
    PhotoId::new(raw).map_err(|e| CacheError::InvalidRecord(e.to_string()))
}

fn album_id_from_str(raw: String) -> Result<AlbumId, CacheError> {
    AlbumId::new(raw).map_err(|e| CacheError::InvalidRecord(e.to_string()))
}

#[async_trait::async_trait]
impl IRecordStore for SqliteRecordStore {
    // --- Photo operations ---

    async fn list_photos(&self) -> anyhow::Result<BTreeMap<PhotoPath, PhotoId>> {
        let rows = sqlx::query("SELECT path, photo_id FROM photos ORDER BY path")
            .fetch_all(&self.pool)
            .await?;

        let mut photos = BTreeMap::new();
        for row in &rows {
            photos.insert(photo_path_from_row(row)?, photo_id_from_row(row)?);
        }

        tracing::trace!(count = photos.len(), "Listed recorded photos");
        Ok(photos)
    }

    async fn insert_photo(&self, path: &PhotoPath, photo_id: &PhotoId) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO photos (photo_id, path) VALUES (?, ?)")
            .bind(photo_id.as_str())
            .bind(path.as_str())
            .execute(&self.pool)
            .await
            .map_err(CacheError::from)?;

        tracing::trace!(path = %path, photo_id = %photo_id, "Recorded photo");
        Ok(())
    }

    async fn delete_photo(&self, photo_id: &PhotoId) -> anyhow::Result<()> {
        let result = sqlx::query("DELETE FROM photos WHERE photo_id = ?")
            .bind(photo_id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CacheError::NotFound(format!("photo {photo_id}")).into());
        }

        tracing::trace!(photo_id = %photo_id, "Removed photo record");
        Ok(())
    }

    async fn set_photo_album(
        &self,
        photo_id: &PhotoId,
        album_id: &AlbumId,
    ) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE photos SET album_id = ? WHERE photo_id = ?")
            .bind(album_id.as_str())
            .bind(photo_id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CacheError::NotFound(format!("photo {photo_id}")).into());
        }

        tracing::trace!(photo_id = %photo_id, album_id = %album_id, "Recorded album for photo");
        Ok(())
    }

    async fn list_photos_without_album(&self) -> anyhow::Result<Vec<PhotoRecord>> {
        let rows =
            sqlx::query("SELECT path, photo_id FROM photos WHERE album_id IS NULL ORDER BY path")
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|row| {
                Ok(PhotoRecord {
                    path: photo_path_from_row(row)?,
                    photo_id: photo_id_from_row(row)?,
                    album_id: None,
                })
            })
            .collect()
    }

    async fn count_photos(&self) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    // --- Album operations ---

    async fn find_album_id(&self, name: &str) -> anyhow::Result<Option<AlbumId>> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT album_id FROM albums WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(raw.map(album_id_from_str).transpose()?)
    }

    async fn insert_album(&self, album_id: &AlbumId, name: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO albums (album_id, name) VALUES (?, ?)")
            .bind(album_id.as_str())
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(CacheError::from)?;

        tracing::trace!(album_id = %album_id, name = %name, "Recorded album");
        Ok(())
    }

    async fn count_albums(&self) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM albums")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
