//! Sync engine
//!
//! The [`SyncEngine`] brings the Flickr photostream in line with the local
//! photo library, using the record store to remember what was uploaded.
//!
//! ## Sync Flow
//!
//! 1. **Snapshots**: enumerate local photos and list recorded uploads
//! 2. **Plan**: reconcile the two snapshots into a [`WorkPlan`]
//! 3. **Upload**: upload each new photo, record it, file it into its album
//! 4. **Album repair**: file recorded photos that never got an album
//! 5. **Delete**: delete photos whose file is gone, then forget them
//!
//! Every photo is handled to completion before the next starts, and every
//! successful Flickr call is recorded before moving on. The first failure
//! aborts the run; photos already processed stay committed and the rest are
//! left for the next run.
//!
//! ## Orphan windows
//!
//! Flickr is always called before the record store is written. A crash
//! between the two leaves an uploaded photo unrecorded (the next run uploads
//! it again) or a deleted photo still recorded (the next run deletes it
//! again). There is no two-phase commit.
//!
//! ## Cancellation
//!
//! The [`StopFlag`] is checked before each photo in every phase. A stop ends
//! the phase with `stopped = true` and is not an error; the call in flight
//! always completes.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use flickrsync_core::domain::{PhotoId, PhotoPath};
use flickrsync_core::ports::{ILocalFileIndex, IRecordStore, IRemoteGateway};

use crate::albums::{assign_album, AlbumAssignment};
use crate::cancel::StopFlag;
use crate::reconcile::{reconcile, WorkPlan};
use crate::SyncError;

// ============================================================================
// Reports
// ============================================================================

/// Outcome of one phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseReport {
    /// Photos fully processed (Flickr call and bookkeeping both done)
    pub processed: usize,
    /// Photos left untouched because the phase was stopped
    pub remaining: usize,
    /// Whether the phase ended because a stop was requested
    pub stopped: bool,
    /// Albums created on Flickr during the phase
    pub albums_created: usize,
}

/// Summary of a complete run
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Photos found in the local library
    pub local_photos: usize,
    /// Photos recorded before the run
    pub recorded_photos: usize,
    pub upload: PhaseReport,
    pub repair: PhaseReport,
    pub delete: PhaseReport,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// Returns true if any phase was cut short by a stop request
    pub fn stopped(&self) -> bool {
        self.upload.stopped || self.repair.stopped || self.delete.stopped
    }

    /// Albums created across all phases
    pub fn albums_created(&self) -> usize {
        self.upload.albums_created + self.repair.albums_created
    }
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Snapshots taken at the start of a run
///
/// Never mutated after they are read; all changes go through the phases.
#[derive(Debug)]
struct Snapshots {
    local: Vec<PhotoPath>,
    recorded: BTreeMap<PhotoPath, PhotoId>,
}

/// Reconciliation and sync orchestrator
///
/// ## Dependencies
///
/// - `index`: local photo library
/// - `store`: persistent record of uploads and albums
/// - `gateway`: Flickr
///
/// The phases can be invoked one by one or chained with [`SyncEngine::run`].
/// Each phase remembers how far it got, so calling it again after a stop
/// resumes where it left off.
pub struct SyncEngine {
    index: Arc<dyn ILocalFileIndex>,
    store: Arc<dyn IRecordStore>,
    gateway: Arc<dyn IRemoteGateway>,
    stop: StopFlag,
    snapshots: Option<Snapshots>,
    plan: Option<WorkPlan>,
    /// Photo ids scheduled for deletion, for the album repair phase
    doomed: HashSet<PhotoId>,
    uploads_done: usize,
    deletes_done: usize,
}

impl SyncEngine {
    /// Creates a new `SyncEngine` with the given dependencies
    ///
    /// # Arguments
    /// * `index` - Local photo library (ILocalFileIndex)
    /// * `store` - Record store (IRecordStore)
    /// * `gateway` - Flickr operations (IRemoteGateway)
    /// * `stop` - Stop flag; keep a clone to request a stop from elsewhere
    pub fn new(
        index: Arc<dyn ILocalFileIndex>,
        store: Arc<dyn IRecordStore>,
        gateway: Arc<dyn IRemoteGateway>,
        stop: StopFlag,
    ) -> Self {
        Self {
            index,
            store,
            gateway,
            stop,
            snapshots: None,
            plan: None,
            doomed: HashSet::new(),
            uploads_done: 0,
            deletes_done: 0,
        }
    }

    /// The engine's stop flag
    pub fn stop_flag(&self) -> &StopFlag {
        &self.stop
    }

    /// The current work plan, if [`SyncEngine::plan`] has run
    pub fn work_plan(&self) -> Option<&WorkPlan> {
        self.plan.as_ref()
    }

    // ========================================================================
    // Step 1: snapshots
    // ========================================================================

    /// Reads the local library and the recorded uploads
    ///
    /// Discards any previous plan and phase progress.
    ///
    /// # Returns
    /// The number of local photos and recorded photos
    #[instrument(skip(self))]
    pub async fn load_snapshots(&mut self) -> Result<(usize, usize), SyncError> {
        self.snapshots = None;
        self.plan = None;
        self.doomed.clear();
        self.uploads_done = 0;
        self.deletes_done = 0;

        let local = self
            .index
            .enumerate()
            .await
            .map_err(|e| SyncError::local_index(self.index.root().display(), e))?;
        let recorded = self
            .store
            .list_photos()
            .await
            .map_err(|e| SyncError::store("list_photos", "all photos", e))?;

        info!(
            local = local.len(),
            recorded = recorded.len(),
            "Loaded snapshots"
        );
        let counts = (local.len(), recorded.len());
        self.snapshots = Some(Snapshots { local, recorded });
        Ok(counts)
    }

    // ========================================================================
    // Step 2: plan
    // ========================================================================

    /// Computes the work plan from the loaded snapshots
    ///
    /// # Errors
    /// `SyncError::NotInitialized` if the snapshots have not been loaded
    #[instrument(skip(self))]
    pub fn plan(&mut self) -> Result<&WorkPlan, SyncError> {
        let snapshots = self.snapshots.as_ref().ok_or(SyncError::NotInitialized {
            phase: "plan",
            prerequisite: "load_snapshots",
        })?;

        let plan = reconcile(&snapshots.local, &snapshots.recorded);
        info!(
            to_upload = plan.to_upload.len(),
            to_delete = plan.to_delete.len(),
            "Work plan computed"
        );

        self.doomed = plan.to_delete.iter().cloned().collect();
        self.uploads_done = 0;
        self.deletes_done = 0;
        Ok(self.plan.insert(plan))
    }

    fn require_plan(&self, phase: &'static str) -> Result<&WorkPlan, SyncError> {
        self.plan.as_ref().ok_or(SyncError::NotInitialized {
            phase,
            prerequisite: "plan",
        })
    }

    // ========================================================================
    // Step 3: upload
    // ========================================================================

    /// Uploads every planned photo, in plan order
    ///
    /// Per photo: upload, record, decompose the path, assign the album and
    /// record the album against the photo.
    ///
    /// The cursor moves past a photo as soon as its upload is recorded. If
    /// the album step then fails, calling the phase again does not upload
    /// the photo twice; [`SyncEngine::repair_albums`] files it instead.
    ///
    /// # Errors
    /// The first failing photo aborts the phase; earlier photos stay committed.
    #[instrument(skip(self))]
    pub async fn upload_new(&mut self) -> Result<PhaseReport, SyncError> {
        let pending: Vec<PhotoPath> = self.require_plan("upload_new")?.to_upload
            [self.uploads_done..]
            .to_vec();
        let mut report = PhaseReport::default();

        for (i, path) in pending.iter().enumerate() {
            if self.stop.is_stopped() {
                report.stopped = true;
                report.remaining = pending.len() - i;
                info!(
                    processed = report.processed,
                    remaining = report.remaining,
                    "Upload phase stopped"
                );
                return Ok(report);
            }

            let photo_id = self.upload_one(path).await?;
            self.uploads_done += 1;

            let placement = self
                .index
                .decompose(path)
                .map_err(|e| SyncError::local_index(path, e))?;
            let assignment = self.file_into_album(&photo_id, &placement.album).await?;
            info!(
                path = %path,
                photo_id = %photo_id,
                album = %placement.album,
                "Photo uploaded"
            );

            report.processed += 1;
            if assignment.created() {
                report.albums_created += 1;
            }
        }

        info!(uploaded = report.processed, "Upload phase complete");
        Ok(report)
    }

    /// Uploads one photo and records it
    async fn upload_one(&self, path: &PhotoPath) -> Result<PhotoId, SyncError> {
        let photo_id = self
            .gateway
            .upload_photo(path)
            .await
            .map_err(|e| SyncError::remote("upload_photo", path, e))?;

        // Recorded before anything else touches this photo
        self.store
            .insert_photo(path, &photo_id)
            .await
            .map_err(|e| SyncError::store("insert_photo", path, e))?;

        debug!(path = %path, photo_id = %photo_id, "Upload recorded");
        Ok(photo_id)
    }

    async fn file_into_album(
        &self,
        photo_id: &PhotoId,
        album: &str,
    ) -> Result<AlbumAssignment, SyncError> {
        let assignment =
            assign_album(self.store.as_ref(), self.gateway.as_ref(), photo_id, album).await?;
        self.store
            .set_photo_album(photo_id, assignment.album_id())
            .await
            .map_err(|e| SyncError::store("set_photo_album", photo_id, e))?;
        Ok(assignment)
    }

    // ========================================================================
    // Step 4: album repair
    // ========================================================================

    /// Files recorded photos that have no album yet
    ///
    /// A previous run may have recorded an upload and then failed before the
    /// album was recorded. Photos scheduled for deletion are skipped.
    #[instrument(skip(self))]
    pub async fn repair_albums(&mut self) -> Result<PhaseReport, SyncError> {
        self.require_plan("repair_albums")?;

        let unassigned = self
            .store
            .list_photos_without_album()
            .await
            .map_err(|e| SyncError::store("list_photos_without_album", "all photos", e))?;
        let pending: Vec<_> = unassigned
            .into_iter()
            .filter(|record| !self.doomed.contains(&record.photo_id))
            .collect();

        let mut report = PhaseReport::default();
        if pending.is_empty() {
            debug!("No photos without an album");
            return Ok(report);
        }
        warn!(count = pending.len(), "Recorded photos without an album");

        for (i, record) in pending.iter().enumerate() {
            if self.stop.is_stopped() {
                report.stopped = true;
                report.remaining = pending.len() - i;
                info!(
                    processed = report.processed,
                    remaining = report.remaining,
                    "Album repair stopped"
                );
                return Ok(report);
            }

            let placement = self
                .index
                .decompose(&record.path)
                .map_err(|e| SyncError::local_index(&record.path, e))?;
            let assignment = self
                .file_into_album(&record.photo_id, &placement.album)
                .await?;

            info!(
                path = %record.path,
                photo_id = %record.photo_id,
                album = %placement.album,
                "Album assignment repaired"
            );
            report.processed += 1;
            if assignment.created() {
                report.albums_created += 1;
            }
        }

        Ok(report)
    }

    // ========================================================================
    // Step 5: delete
    // ========================================================================

    /// Deletes every planned photo from Flickr, then forgets it
    ///
    /// Album records are never touched.
    ///
    /// # Errors
    /// The first failing photo aborts the phase; earlier photos stay committed.
    #[instrument(skip(self))]
    pub async fn delete_removed(&mut self) -> Result<PhaseReport, SyncError> {
        let pending: Vec<PhotoId> = self.require_plan("delete_removed")?.to_delete
            [self.deletes_done..]
            .to_vec();
        let mut report = PhaseReport::default();

        for (i, photo_id) in pending.iter().enumerate() {
            if self.stop.is_stopped() {
                report.stopped = true;
                report.remaining = pending.len() - i;
                info!(
                    processed = report.processed,
                    remaining = report.remaining,
                    "Delete phase stopped"
                );
                return Ok(report);
            }

            self.gateway
                .delete_photo(photo_id)
                .await
                .map_err(|e| SyncError::remote("delete_photo", photo_id, e))?;
            self.store
                .delete_photo(photo_id)
                .await
                .map_err(|e| SyncError::store("delete_photo", photo_id, e))?;

            info!(photo_id = %photo_id, "Photo deleted");
            self.deletes_done += 1;
            report.processed += 1;
        }

        info!(deleted = report.processed, "Delete phase complete");
        Ok(report)
    }

    // ========================================================================
    // Full run
    // ========================================================================

    /// Runs every step in order
    ///
    /// # Returns
    /// A [`SyncReport`]; check [`SyncReport::stopped`] for a clean stop
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<SyncReport, SyncError> {
        let start = Instant::now();

        let (local_photos, recorded_photos) = self.load_snapshots().await?;
        self.plan()?;

        let upload = self.upload_new().await?;
        let repair = self.repair_albums().await?;
        let delete = self.delete_removed().await?;

        let report = SyncReport {
            local_photos,
            recorded_photos,
            upload,
            repair,
            delete,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            uploaded = report.upload.processed,
            repaired = report.repair.processed,
            deleted = report.delete.processed,
            albums_created = report.albums_created(),
            stopped = report.stopped(),
            duration_ms = report.duration_ms,
            "Sync run finished"
        );
        Ok(report)
    }
}
