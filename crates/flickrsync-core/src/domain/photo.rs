//! Photo and album records
//!
//! The record store keeps one [`PhotoRecord`] per uploaded photo. Albums are
//! stored as bare `(album_id, name)` rows and looked up by name.

use serde::{Deserialize, Serialize};

use super::newtypes::{AlbumId, PhotoId, PhotoPath};

/// A photo that has been uploaded and recorded
///
/// A record exists if and only if an upload of `path` succeeded and its
/// deletion has not yet succeeded. `album_id` stays `None` until album
/// assignment for the photo has been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Local identifier of the photo
    pub path: PhotoPath,
    /// Flickr photo id
    pub photo_id: PhotoId,
    /// Album the photo was filed into, if any
    pub album_id: Option<AlbumId>,
}

/// Where a photo belongs, derived from its path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumPlacement {
    /// Album title (the photo's directory relative to the library root)
    pub album: String,
    /// Bare file name of the photo
    pub file_name: String,
}

/// Outcome of adding a photo to an existing album
///
/// Flickr reports "Photo already in set" as an API error; the gateway maps it
/// to `AlreadyMember` so callers can treat it as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumMembership {
    /// The photo was added to the album
    Added,
    /// The photo was already a member of the album
    AlreadyMember,
}
