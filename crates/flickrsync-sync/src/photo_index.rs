//! Local photo library adapter (secondary/driven adapter)
//!
//! Implements [`ILocalFileIndex`] by walking the library root with `walkdir`.
//!
//! ## Design Decisions
//!
//! - **Blocking walk**: the directory walk runs inside `spawn_blocking` so
//!   large libraries do not stall the runtime.
//! - **Excluded subtrees**: directories whose name is in `exclude_dirs` are
//!   pruned with `filter_entry`, so nothing below them is visited.
//! - **Walk errors are fatal**: an unreadable subdirectory fails the whole
//!   enumeration. Skipping it would make its photos look deleted.
//! - **Non-UTF-8 paths** cannot be stored as a [`PhotoPath`]; they are
//!   skipped with a warning.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{debug, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use flickrsync_core::config::SyncConfig;
use flickrsync_core::domain::{AlbumPlacement, PhotoPath};
use flickrsync_core::ports::ILocalFileIndex;

/// Adapter that bridges the [`ILocalFileIndex`] port to a directory tree
#[derive(Debug, Clone)]
pub struct PhotoIndex {
    root: PathBuf,
    exclude_dirs: Vec<String>,
    /// Lowercase, without the leading dot
    extensions: Vec<String>,
}

impl PhotoIndex {
    pub fn new(root: impl Into<PathBuf>, exclude_dirs: Vec<String>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            exclude_dirs,
            extensions: extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Builds an index from the `sync` config section
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.root.clone(),
            config.exclude_dirs.clone(),
            config.extensions.clone(),
        )
    }
}

#[async_trait::async_trait]
impl ILocalFileIndex for PhotoIndex {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn enumerate(&self) -> anyhow::Result<Vec<PhotoPath>> {
        let index = self.clone();
        let photos = tokio::task::spawn_blocking(move || index.scan())
            .await
            .context("Photo scan task panicked")??;

        debug!(count = photos.len(), "Enumerated local photos");
        Ok(photos)
    }

    fn decompose(&self, path: &PhotoPath) -> anyhow::Result<AlbumPlacement> {
        Ok(path.placement_under(&self.root)?)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

impl PhotoIndex {
    fn scan(&self) -> anyhow::Result<Vec<PhotoPath>> {
        let metadata = std::fs::metadata(&self.root)
            .with_context(|| format!("Can't read library root {}", self.root.display()))?;
        if !metadata.is_dir() {
            bail!("Library root {} is not a directory", self.root.display());
        }

        let mut photos = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry));

        for entry in walker {
            let entry = entry.with_context(|| {
                format!("Failed to walk library under {}", self.root.display())
            })?;
            if !entry.file_type().is_file() || !self.has_photo_extension(entry.path()) {
                continue;
            }

            match entry.path().to_str() {
                Some(path) => photos.push(PhotoPath::new(path)?),
                None => warn!(path = %entry.path().display(), "Skipping non-UTF-8 path"),
            }
        }

        photos.sort();
        Ok(photos)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && self
                .exclude_dirs
                .iter()
                .any(|name| entry.file_name() == name.as_str())
    }

    fn has_photo_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}
