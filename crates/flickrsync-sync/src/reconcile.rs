//! Reconciliation of local photos against recorded uploads
//!
//! [`reconcile`] compares the local library snapshot with the record store
//! snapshot and produces the [`WorkPlan`] for one run. It never updates
//! existing uploads: a photo that is both local and recorded is left alone.

use std::collections::BTreeMap;

use flickrsync_core::domain::{PhotoId, PhotoPath};

/// Work computed once per run from two point-in-time snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkPlan {
    /// Local photos with no record, in byte-wise path order
    pub to_upload: Vec<PhotoPath>,
    /// Flickr ids of recorded photos whose path is gone locally,
    /// in recorded path order
    pub to_delete: Vec<PhotoId>,
}

impl WorkPlan {
    /// Returns true if there is nothing to upload or delete
    pub fn is_empty(&self) -> bool {
        self.to_upload.is_empty() && self.to_delete.is_empty()
    }
}

/// Computes the photos to upload and the recorded photos to delete
///
/// `local` is re-sorted byte-wise here regardless of the order the index
/// returned: locale-aware directory listings can disagree with the byte
/// order the binary search below relies on. Duplicate paths are collapsed.
///
/// An empty `local` schedules every recorded photo for deletion.
pub fn reconcile(local: &[PhotoPath], recorded: &BTreeMap<PhotoPath, PhotoId>) -> WorkPlan {
    let mut sorted = local.to_vec();
    sorted.sort();
    sorted.dedup();

    let to_upload = sorted
        .iter()
        .filter(|path| !recorded.contains_key(*path))
        .cloned()
        .collect();

    let to_delete = recorded
        .iter()
        .filter(|(path, _)| sorted.binary_search(path).is_err())
        .map(|(_, photo_id)| photo_id.clone())
        .collect();

    WorkPlan {
        to_upload,
        to_delete,
    }
}
