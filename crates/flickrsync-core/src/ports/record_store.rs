//! Record store port (driven/secondary port)
//!
//! This module defines the interface for the durable record of what has
//! already been uploaded to Flickr and which albums this tool created.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific.
//! - A constraint violation (inserting a photo path twice, an album name
//!   twice) is returned as an error: it signals a logic defect upstream,
//!   not a recoverable condition.
//! - The store is driven from a single task during a run; implementations
//!   need not serialize concurrent writers.

use std::collections::BTreeMap;

use crate::domain::{AlbumId, PhotoId, PhotoPath, PhotoRecord};

/// Port trait for the persistent photo/album record
#[async_trait::async_trait]
pub trait IRecordStore: Send + Sync {
    // --- Photo operations ---

    /// Returns every recorded photo as a path → photo id mapping
    async fn list_photos(&self) -> anyhow::Result<BTreeMap<PhotoPath, PhotoId>>;

    /// Records a freshly uploaded photo
    ///
    /// # Errors
    /// Fails if `path` or `photo_id` is already recorded.
    async fn insert_photo(&self, path: &PhotoPath, photo_id: &PhotoId) -> anyhow::Result<()>;

    /// Removes the record of a photo by its Flickr id
    ///
    /// # Errors
    /// Fails if no photo with this id is recorded.
    async fn delete_photo(&self, photo_id: &PhotoId) -> anyhow::Result<()>;

    /// Records the album a photo was filed into
    ///
    /// # Errors
    /// Fails if no photo with this id is recorded.
    async fn set_photo_album(&self, photo_id: &PhotoId, album_id: &AlbumId)
        -> anyhow::Result<()>;

    /// Lists recorded photos that have not been filed into an album yet
    async fn list_photos_without_album(&self) -> anyhow::Result<Vec<PhotoRecord>>;

    /// Number of recorded photos
    async fn count_photos(&self) -> anyhow::Result<u64>;

    // --- Album operations ---

    /// Looks up the Flickr id of an album by its name
    ///
    /// # Returns
    /// `None` if no album with this name has been recorded
    async fn find_album_id(&self, name: &str) -> anyhow::Result<Option<AlbumId>>;

    /// Records a freshly created album
    ///
    /// # Errors
    /// Fails if an album with the same name or id is already recorded.
    async fn insert_album(&self, album_id: &AlbumId, name: &str) -> anyhow::Result<()>;

    /// Number of recorded albums
    async fn count_albums(&self) -> anyhow::Result<u64>;
}
