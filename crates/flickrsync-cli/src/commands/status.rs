//! Status command - Display what is recorded and what is pending
//!
//! Provides the `flickrsync status` CLI command which:
//! 1. Shows how many photos and albums the record store holds
//! 2. Scans the library and shows how many photos a sync would upload or delete
//! 3. Shows recorded photos that are still missing their album
//!
//! Nothing is sent to Flickr.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use flickrsync_cache::{DatabasePool, SqliteRecordStore};
use flickrsync_core::ports::{ILocalFileIndex, IRecordStore};
use flickrsync_sync::{reconcile, PhotoIndex, WorkPlan};

use super::CliContext;
use crate::output::plural;

#[derive(Debug, Args)]
pub struct StatusCommand {
    /// List the pending paths and photo ids, not just counts
    #[arg(long)]
    pub list: bool,
}

/// Snapshot of the record store next to the current library
#[derive(Debug)]
struct StatusSnapshot {
    photos: u64,
    albums: u64,
    without_album: Vec<String>,
    plan: WorkPlan,
}

impl StatusCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_valid_config()?;

        if !config.database.path.exists() {
            formatter.error("No database found. Run 'flickrsync auth login' and 'flickrsync sync' first.");
            return Ok(());
        }

        let pool = DatabasePool::new(&config.database.path)
            .await
            .context("Failed to open database")?;
        let store = SqliteRecordStore::new(pool.pool().clone());
        let index = PhotoIndex::from_config(&config.sync);

        let snapshot = collect(&index, &store).await;
        pool.close().await;
        let snapshot = snapshot?;

        info!(
            photos = snapshot.photos,
            albums = snapshot.albums,
            to_upload = snapshot.plan.to_upload.len(),
            to_delete = snapshot.plan.to_delete.len(),
            "Collected status"
        );

        if ctx.is_json() {
            let mut json = serde_json::json!({
                "root": index.root().display().to_string(),
                "recorded_photos": snapshot.photos,
                "recorded_albums": snapshot.albums,
                "pending_upload": snapshot.plan.to_upload.len(),
                "pending_delete": snapshot.plan.to_delete.len(),
                "without_album": snapshot.without_album.len(),
            });
            if self.list {
                json["to_upload"] = serde_json::json!(snapshot
                    .plan
                    .to_upload
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>());
                json["to_delete"] = serde_json::json!(snapshot
                    .plan
                    .to_delete
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>());
                json["without_album_paths"] = serde_json::json!(snapshot.without_album);
            }
            formatter.print_json(&json);
            return Ok(());
        }

        formatter.success(&format!("Library: {}", index.root().display()));
        formatter.info(&format!("Recorded:       {}", plural(snapshot.photos as usize, "photo")));
        formatter.info(&format!("Albums:         {}", plural(snapshot.albums as usize, "album")));
        formatter.info(&format!("To upload:      {}", snapshot.plan.to_upload.len()));
        formatter.info(&format!("To delete:      {}", snapshot.plan.to_delete.len()));
        formatter.info(&format!("Missing album:  {}", snapshot.without_album.len()));

        if self.list {
            for path in &snapshot.plan.to_upload {
                formatter.info(&format!("+ {path}"));
            }
            for photo_id in &snapshot.plan.to_delete {
                formatter.info(&format!("- {photo_id}"));
            }
            for path in &snapshot.without_album {
                formatter.info(&format!("? {path}"));
            }
        }

        if snapshot.plan.is_empty() && snapshot.without_album.is_empty() {
            formatter.info("Up to date");
        } else {
            formatter.info("Run 'flickrsync sync' to apply pending changes");
        }

        Ok(())
    }
}

async fn collect(index: &dyn ILocalFileIndex, store: &dyn IRecordStore) -> Result<StatusSnapshot> {
    let local = index
        .enumerate()
        .await
        .with_context(|| format!("Failed to scan {}", index.root().display()))?;
    let recorded = store
        .list_photos()
        .await
        .context("Failed to read recorded photos")?;
    let without_album = store
        .list_photos_without_album()
        .await
        .context("Failed to read photos without album")?
        .into_iter()
        .map(|record| record.path.to_string())
        .collect();

    Ok(StatusSnapshot {
        photos: store.count_photos().await?,
        albums: store.count_albums().await?,
        without_album,
        plan: reconcile(&local, &recorded),
    })
}
