//! CLI subcommands

pub mod auth;
pub mod completions;
pub mod config;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::debug;

use flickrsync_core::config::Config;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Settings shared by every subcommand
#[derive(Debug, Clone)]
pub struct CliContext {
    pub format: OutputFormat,
    pub config_path: PathBuf,
    pub quiet: bool,
}

impl CliContext {
    pub fn new(format: OutputFormat, config_path: PathBuf, quiet: bool) -> Self {
        Self {
            format,
            config_path,
            quiet,
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.is_json(), self.quiet)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the config file, or the defaults if there is none
    ///
    /// A file that exists but cannot be parsed is an error.
    pub fn load_config(&self) -> Result<Config> {
        if self.config_path.exists() {
            Config::load(&self.config_path)
        } else {
            debug!(config_path = %self.config_path.display(), "No config file, using defaults");
            Ok(Config::default())
        }
    }

    /// Loads the config and fails if it does not validate
    pub fn load_valid_config(&self) -> Result<Config> {
        let config = self.load_config()?;
        let errors = config.validate();
        if !errors.is_empty() {
            let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            bail!(
                "Invalid configuration ({}): {}",
                self.config_path.display(),
                details.join("; ")
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(path: PathBuf) -> CliContext {
        CliContext::new(OutputFormat::Human, path, false)
    }

    #[test]
    fn test_missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ctx(dir.path().join("none.yaml")).load_config().unwrap();
        assert_eq!(config.flickr.request_delay_ms, 1000);
    }

    #[test]
    fn test_unparseable_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "sync: [not, a, map]").unwrap();
        assert!(ctx(path).load_config().is_err());
    }

    #[test]
    fn test_load_valid_config_reports_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            format!("sync:\n  root: {}\n", dir.path().display()),
        )
        .unwrap();

        let err = ctx(path).load_valid_config().unwrap_err().to_string();
        assert!(err.contains("flickr.api_key"));
        assert!(!err.contains("sync.root"));
    }

    #[test]
    fn test_load_valid_config_accepts_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            format!(
                "sync:\n  root: {root}\ndatabase:\n  path: {root}/db.sqlite\nflickr:\n  api_key: k\n  api_secret: s\n",
                root = dir.path().display()
            ),
        )
        .unwrap();

        let config = ctx(path).load_valid_config().unwrap();
        assert_eq!(config.flickr.api_key, "k");
    }
}
