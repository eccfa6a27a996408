//! Sync command - Synchronize the photo library with Flickr
//!
//! Provides the `flickrsync sync` CLI command which:
//! 1. Loads and validates configuration
//! 2. Loads the OAuth access token from the token file
//! 3. Opens the record store and builds the adapters (Flickr, SQLite, photo index)
//! 4. Installs a SIGINT/SIGTERM handler that requests a clean stop
//! 5. Runs the SyncEngine and displays results

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use flickrsync_cache::{DatabasePool, SqliteRecordStore};
use flickrsync_core::config::Config;
use flickrsync_flickr::auth::TokenFileStorage;
use flickrsync_flickr::FlickrGateway;
use flickrsync_sync::{PhotoIndex, StopFlag, SyncEngine, SyncReport, WorkPlan};

use super::CliContext;
use crate::output::{format_duration_ms, plural, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Show what would be uploaded and deleted without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    /// Wires up all adapters, creates the SyncEngine and runs it
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_valid_config()?;
        info!(config_path = %ctx.config_path().display(), "Loaded configuration");

        let token = TokenFileStorage::new(&config.auth.token_file)
            .load()?
            .context("Not authorized. Run 'flickrsync auth login' first.")?;

        let pool = DatabasePool::new(&config.database.path)
            .await
            .context("Failed to open database")?;

        let stop = StopFlag::new();
        let signals = tokio::spawn(stop_on_signal(stop.clone()));

        let outcome = self.run(ctx, &config, &pool, token, stop).await;

        signals.abort();
        pool.close().await;

        outcome.map(|report| {
            if let Some(report) = report {
                print_report(ctx, &*formatter, &report);
            }
        })
    }

    async fn run(
        &self,
        ctx: &CliContext,
        config: &Config,
        pool: &DatabasePool,
        token: flickrsync_flickr::OAuthToken,
        stop: StopFlag,
    ) -> Result<Option<SyncReport>> {
        let store = Arc::new(SqliteRecordStore::new(pool.pool().clone()));
        let index = Arc::new(PhotoIndex::from_config(&config.sync));
        let gateway = Arc::new(FlickrGateway::from_config(&config.flickr, token));
        let mut engine = SyncEngine::new(index, store, gateway, stop);

        if self.dry_run {
            engine.load_snapshots().await?;
            let plan = engine.plan()?;
            print_plan(ctx, &*ctx.formatter(), plan);
            return Ok(None);
        }

        ctx.formatter().info(&format!(
            "Syncing {} with Flickr...",
            config.sync.root.display()
        ));
        let report = engine.run().await.context("Sync failed")?;
        Ok(Some(report))
    }
}

/// Waits for SIGINT or SIGTERM and requests a clean stop
///
/// The photo being processed when the signal arrives is finished first.
async fn stop_on_signal(stop: StopFlag) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    stop.stop();
}

fn print_plan(ctx: &CliContext, formatter: &dyn OutputFormatter, plan: &WorkPlan) {
    if ctx.is_json() {
        let json = serde_json::json!({
            "dry_run": true,
            "to_upload": plan.to_upload.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            "to_delete": plan.to_delete.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        });
        formatter.print_json(&json);
        return;
    }

    if plan.is_empty() {
        formatter.success("Dry run: already up to date");
        return;
    }

    formatter.success(&format!(
        "Dry run: {} to upload, {} to delete",
        plural(plan.to_upload.len(), "photo"),
        plural(plan.to_delete.len(), "photo")
    ));
    for path in &plan.to_upload {
        formatter.info(&format!("+ {path}"));
    }
    for photo_id in &plan.to_delete {
        formatter.info(&format!("- {photo_id}"));
    }
}

fn print_report(ctx: &CliContext, formatter: &dyn OutputFormatter, report: &SyncReport) {
    if ctx.is_json() {
        let json = serde_json::json!({
            "local_photos": report.local_photos,
            "recorded_photos": report.recorded_photos,
            "uploaded": report.upload.processed,
            "albums_repaired": report.repair.processed,
            "deleted": report.delete.processed,
            "albums_created": report.albums_created(),
            "stopped": report.stopped(),
            "remaining": {
                "upload": report.upload.remaining,
                "repair": report.repair.remaining,
                "delete": report.delete.remaining,
            },
            "duration_ms": report.duration_ms,
        });
        formatter.print_json(&json);
        return;
    }

    let duration = format_duration_ms(report.duration_ms);
    let changed = report.upload.processed + report.repair.processed + report.delete.processed;

    if report.stopped() {
        formatter.warn(&format!("Sync stopped after {duration}; run it again to continue"));
    } else if changed == 0 {
        formatter.success("Already up to date");
    } else {
        formatter.success(&format!("Sync completed in {duration}"));
    }

    if report.upload.processed > 0 {
        formatter.info(&format!(
            "Uploaded:       {}",
            plural(report.upload.processed, "photo")
        ));
    }
    if report.albums_created() > 0 {
        formatter.info(&format!(
            "Albums created: {}",
            report.albums_created()
        ));
    }
    if report.repair.processed > 0 {
        formatter.info(&format!(
            "Albums fixed:   {}",
            plural(report.repair.processed, "photo")
        ));
    }
    if report.delete.processed > 0 {
        formatter.info(&format!(
            "Deleted:        {}",
            plural(report.delete.processed, "photo")
        ));
    }

    let remaining = report.upload.remaining + report.repair.remaining + report.delete.remaining;
    if remaining > 0 {
        formatter.info(&format!("Remaining:      {remaining}"));
    }
}
