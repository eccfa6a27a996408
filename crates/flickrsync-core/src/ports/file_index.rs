//! Local file index port (driven/secondary port)
//!
//! This module defines the interface for discovering the photos that are
//! eligible for upload, and for mapping each photo to the album it belongs in.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because enumeration errors are adapter-specific
//!   (an unreadable root directory, a vanished mount point).
//! - `decompose` is synchronous and pure: it never touches the filesystem.

use std::path::Path;

use crate::domain::{AlbumPlacement, PhotoPath};

/// Port trait for the local photo library
///
/// Implementations walk a library root, skip excluded subtrees and files
/// with non-matching extensions, and report the remaining photos.
#[async_trait::async_trait]
pub trait ILocalFileIndex: Send + Sync {
    /// Lists every eligible photo under the library root
    ///
    /// # Returns
    /// Photo paths, usually sorted byte-wise. Reconciliation sorts and
    /// deduplicates them again.
    ///
    /// # Errors
    /// Returns an error if the root path is missing or unreadable.
    async fn enumerate(&self) -> anyhow::Result<Vec<PhotoPath>>;

    /// Splits a photo path into its album name and file name
    ///
    /// # Errors
    /// Fails only if `path` is not rooted under the library root, which
    /// indicates a programming error upstream.
    fn decompose(&self, path: &PhotoPath) -> anyhow::Result<AlbumPlacement>;

    /// The library root this index enumerates
    fn root(&self) -> &Path;
}
