//! Album assignment
//!
//! Files an uploaded photo into the album named after its directory. The
//! first photo of an album creates it (Flickr albums cannot be empty);
//! later photos are added to the recorded album.
//!
//! Re-running the assignment for the same photo and album is harmless:
//! the album already exists in the record, and Flickr's "already in set"
//! answer is treated as success.

use tracing::{debug, info};

use flickrsync_core::domain::{AlbumId, AlbumMembership, PhotoId};
use flickrsync_core::ports::{IRecordStore, IRemoteGateway};

use crate::SyncError;

/// How a photo ended up in its album
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumAssignment {
    /// The album did not exist and was created with this photo as its first member
    Created(AlbumId),
    /// The photo was added to an existing album
    Added(AlbumId),
    /// Flickr reported the photo was already in the album
    AlreadyMember(AlbumId),
}

impl AlbumAssignment {
    pub fn album_id(&self) -> &AlbumId {
        match self {
            AlbumAssignment::Created(id)
            | AlbumAssignment::Added(id)
            | AlbumAssignment::AlreadyMember(id) => id,
        }
    }

    /// Returns true if a new album was created
    pub fn created(&self) -> bool {
        matches!(self, AlbumAssignment::Created(_))
    }
}

/// Puts `photo_id` into the album called `album_name`
///
/// Looks the album up in the record store. If it is unknown, the album is
/// created on Flickr seeded with this photo and the new album is recorded.
/// Otherwise the photo is added to the recorded album.
///
/// The caller records the returned album id against the photo.
///
/// # Errors
/// Any store or Flickr failure other than "already in album".
pub async fn assign_album(
    store: &dyn IRecordStore,
    gateway: &dyn IRemoteGateway,
    photo_id: &PhotoId,
    album_name: &str,
) -> Result<AlbumAssignment, SyncError> {
    let existing = store
        .find_album_id(album_name)
        .await
        .map_err(|e| SyncError::store("find_album_id", album_name, e))?;

    let Some(album_id) = existing else {
        let album_id = gateway
            .create_album(album_name, photo_id)
            .await
            .map_err(|e| SyncError::remote("create_album", album_name, e))?;
        store
            .insert_album(&album_id, album_name)
            .await
            .map_err(|e| SyncError::store("insert_album", album_name, e))?;

        info!(album = album_name, album_id = %album_id, photo_id = %photo_id, "Album created");
        return Ok(AlbumAssignment::Created(album_id));
    };

    let membership = gateway
        .add_to_album(photo_id, &album_id)
        .await
        .map_err(|e| SyncError::remote("add_to_album", format!("{photo_id} -> {album_id}"), e))?;

    match membership {
        AlbumMembership::Added => {
            debug!(album = album_name, album_id = %album_id, photo_id = %photo_id, "Photo added to album");
            Ok(AlbumAssignment::Added(album_id))
        }
        AlbumMembership::AlreadyMember => {
            debug!(album = album_name, album_id = %album_id, photo_id = %photo_id, "Photo already in album");
            Ok(AlbumAssignment::AlreadyMember(album_id))
        }
    }
}
