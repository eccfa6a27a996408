//! flickrsync Sync - Reconciliation and sync engine
//!
//! Provides:
//! - Reconciliation of the local photo library against the record store
//! - The upload / album repair / delete phases driving the Flickr gateway
//! - Cooperative cancellation checked between photos
//! - A walkdir-based local photo index
//!
//! ## Modules
//!
//! - [`reconcile`] - Computes the work plan from two snapshots
//! - [`albums`] - Files an uploaded photo into its album
//! - [`engine`] - Phase orchestration and bookkeeping
//! - [`cancel`] - Stop flag shared with signal handlers
//! - [`photo_index`] - Local photo library adapter

pub mod albums;
pub mod cancel;
pub mod engine;
pub mod photo_index;
pub mod reconcile;

pub use albums::{assign_album, AlbumAssignment};
pub use cancel::StopFlag;
pub use engine::{PhaseReport, SyncEngine, SyncReport};
pub use photo_index::PhotoIndex;
pub use reconcile::{reconcile, WorkPlan};

use thiserror::Error;

/// Errors that abort a sync run
///
/// Every variant names the operation and the photo, album or path it was
/// working on, so a failed run can be diagnosed from the message alone.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Enumerating or decomposing local photos failed
    #[error("Local photo index failed for {target}")]
    LocalIndex {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    /// A record store read or write failed
    #[error("Record store operation '{operation}' failed for {target}")]
    RecordStore {
        operation: &'static str,
        target: String,
        #[source]
        source: anyhow::Error,
    },

    /// A Flickr call failed (after the gateway's own retry, if any)
    #[error("Remote operation '{operation}' failed for {target}")]
    Remote {
        operation: &'static str,
        target: String,
        #[source]
        source: anyhow::Error,
    },

    /// A phase was invoked before the step it depends on
    #[error("'{phase}' requires '{prerequisite}' to run first")]
    NotInitialized {
        phase: &'static str,
        prerequisite: &'static str,
    },
}

impl SyncError {
    pub(crate) fn local_index(target: impl ToString, source: anyhow::Error) -> Self {
        SyncError::LocalIndex {
            target: target.to_string(),
            source,
        }
    }

    pub(crate) fn store(
        operation: &'static str,
        target: impl ToString,
        source: anyhow::Error,
    ) -> Self {
        SyncError::RecordStore {
            operation,
            target: target.to_string(),
            source,
        }
    }

    pub(crate) fn remote(
        operation: &'static str,
        target: impl ToString,
        source: anyhow::Error,
    ) -> Self {
        SyncError::Remote {
            operation,
            target: target.to_string(),
            source,
        }
    }
}
