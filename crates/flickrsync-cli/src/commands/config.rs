//! Config command - View and manage flickrsync configuration
//!
//! Provides the `flickrsync config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::info;

use flickrsync_core::config::Config;

use super::CliContext;

/// Keys accepted by `config set`, with a short description
const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("sync.root", "Photo library directory"),
    ("sync.exclude_dirs", "Comma-separated directory names to skip"),
    ("sync.extensions", "Comma-separated photo extensions"),
    ("database.path", "Record store file"),
    ("flickr.api_key", "Flickr API key"),
    ("flickr.api_secret", "Flickr API secret"),
    ("flickr.request_delay_ms", "Pause between API calls (ms)"),
    ("flickr.upload_retry_delay_secs", "Pause before retrying an upload (s)"),
    ("flickr.upload_tags", "Comma-separated tags for uploads"),
    ("auth.token_file", "Where the access token is stored"),
    ("logging.level", "trace|debug|info|warn|error"),
];

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "sync.root")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx).await,
            ConfigCommand::Set { key, value } => self.execute_set(ctx, key, value).await,
            ConfigCommand::Validate => self.execute_validate(ctx).await,
        }
    }

    async fn execute_show(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;

        info!(config_path = %ctx.config_path().display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", ctx.config_path().display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    /// Sets one value and saves the file
    ///
    /// Only the field being changed has to validate, so a config can be
    /// filled in one key at a time.
    async fn execute_set(&self, ctx: &CliContext, key: &str, value: &str) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = ctx.config_path();
        let mut config = ctx.load_config()?;

        info!(key = %key, value = %value, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "error": e.to_string(),
                }));
            } else {
                formatter.error(&format!("Failed to set '{}': {}", key, e));
                formatter.info("");
                formatter.info("Supported keys:");
                for (name, help) in SUPPORTED_KEYS {
                    formatter.info(&format!("  {name:<32} - {help}"));
                }
            }
            bail!("Could not set '{key}'");
        }

        let errors: Vec<String> = config
            .validate()
            .into_iter()
            .filter(|e| e.field == key)
            .map(|e| e.to_string())
            .collect();
        if !errors.is_empty() {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "errors": errors,
                }));
            } else {
                formatter.error(&format!("Invalid value for '{}': {}", key, errors.join("; ")));
            }
            bail!("Invalid value for '{key}'");
        }

        save_config(&config, config_path)?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "value": value,
                "config_path": config_path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Set {} = {}", key, value));
            formatter.info(&format!("Saved to {}", config_path.display()));
        }

        Ok(())
    }

    async fn execute_validate(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = ctx.config_path();

        if !config_path.exists() {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "valid": false,
                    "config_path": config_path.display().to_string(),
                    "errors": ["Configuration file not found"],
                }));
            } else {
                formatter.error(&format!(
                    "Configuration file not found at {}",
                    config_path.display()
                ));
                formatter.info("Run 'flickrsync config set <key> <value>' to create one.");
            }
            bail!("Configuration file not found");
        }

        let config = match Config::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [format!("Failed to parse configuration: {e:#}")],
                    }));
                } else {
                    formatter.error(&format!("Failed to parse configuration: {e:#}"));
                    formatter.info(&format!("File: {}", config_path.display()));
                }
                bail!("Configuration file could not be parsed");
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!("Configuration is invalid")
        }
    }
}

fn save_config(config: &Config, path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
    }
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    std::fs::write(path, yaml).context("Failed to write configuration file")?;
    Ok(())
}

/// Splits `a, b,,c` into `["a", "b", "c"]`
fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply a dot-notation key/value pair to a Config struct
///
/// List keys take a comma-separated value.
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- sync ---
        "sync.root" => {
            config.sync.root = PathBuf::from(value);
        }
        "sync.exclude_dirs" => {
            config.sync.exclude_dirs = comma_list(value);
        }
        "sync.extensions" => {
            config.sync.extensions = comma_list(value)
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect();
        }

        // --- database ---
        "database.path" => {
            config.database.path = PathBuf::from(value);
        }

        // --- flickr ---
        "flickr.api_key" => {
            config.flickr.api_key = value.to_string();
        }
        "flickr.api_secret" => {
            config.flickr.api_secret = value.to_string();
        }
        "flickr.request_delay_ms" => {
            config.flickr.request_delay_ms = value
                .parse::<u64>()
                .context("Expected a positive integer for flickr.request_delay_ms")?;
        }
        "flickr.upload_retry_delay_secs" => {
            config.flickr.upload_retry_delay_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for flickr.upload_retry_delay_secs")?;
        }
        "flickr.upload_tags" => {
            config.flickr.upload_tags = comma_list(value);
        }

        // --- auth ---
        "auth.token_file" => {
            config.auth.token_file = PathBuf::from(value);
        }

        // --- logging ---
        "logging.level" => {
            config.logging.level = value.to_string();
        }

        _ => {
            bail!("Unknown configuration key: '{}'", key);
        }
    }

    Ok(())
}
