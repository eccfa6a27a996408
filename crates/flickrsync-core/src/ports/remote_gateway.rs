//! Remote gateway port (driven/secondary port)
//!
//! This module defines the four photo-hosting operations the sync engine
//! needs. The primary implementation targets the Flickr API.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result`; adapters attach the provider error code and
//!   message to the error chain.
//! - Implementations apply their own fixed delay before every call and may
//!   retry `upload_photo` once on a transient failure. The engine never
//!   retries on its own.
//! - The "photo already in album" condition is not an error: it is reported
//!   as [`AlbumMembership::AlreadyMember`].

use crate::domain::{AlbumId, AlbumMembership, PhotoId, PhotoPath};

/// Port trait for the photo-hosting service
#[async_trait::async_trait]
pub trait IRemoteGateway: Send + Sync {
    /// Uploads the photo at `path` and returns the id the service assigned
    async fn upload_photo(&self, path: &PhotoPath) -> anyhow::Result<PhotoId>;

    /// Deletes a previously uploaded photo
    async fn delete_photo(&self, photo_id: &PhotoId) -> anyhow::Result<()>;

    /// Creates an album named `name` with `primary_photo` as its first member
    ///
    /// Albums cannot be empty, so creation always seeds one photo.
    async fn create_album(&self, name: &str, primary_photo: &PhotoId) -> anyhow::Result<AlbumId>;

    /// Adds a photo to an existing album
    ///
    /// # Returns
    /// `AlbumMembership::AlreadyMember` when the service reports the photo is
    /// already in the album; any other failure is an error.
    async fn add_to_album(
        &self,
        photo_id: &PhotoId,
        album_id: &AlbumId,
    ) -> anyhow::Result<AlbumMembership>;
}
