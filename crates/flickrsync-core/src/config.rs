//! Configuration module for flickrsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for flickrsync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub database: DatabaseConfig,
    pub flickr: FlickrConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Photo library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Root directory of the local photo library.
    pub root: PathBuf,
    /// Directory names skipped (with their whole subtree) during enumeration.
    pub exclude_dirs: Vec<String>,
    /// File extensions eligible for upload, without the leading dot.
    /// Matching is case-insensitive.
    pub extensions: Vec<String>,
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file.
    pub path: PathBuf,
}

/// Flickr API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlickrConfig {
    pub api_key: String,
    pub api_secret: String,
    /// Fixed delay (milliseconds) applied before every API call.
    pub request_delay_ms: u64,
    /// Back-off (seconds) before the single retry of a failed upload.
    pub upload_retry_delay_secs: u64,
    /// Tags attached to every uploaded photo.
    pub upload_tags: Vec<String>,
}

/// OAuth token persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JSON file holding the OAuth access token and secret.
    pub token_file: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    ///
    /// Sections and fields missing from the file take their default values.
    /// A leading `~/` in path fields is expanded to the home directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config.expand_paths())
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/flickrsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("flickrsync")
            .join("config.yaml")
    }

    fn expand_paths(mut self) -> Self {
        self.sync.root = expand_home(&self.sync.root);
        self.database.path = expand_home(&self.database.path);
        self.auth.token_file = expand_home(&self.auth.token_file);
        self
    }
}

/// Expands a leading `~` component to the user's home directory.
///
/// Paths without a leading `~`, or when no home directory can be determined,
/// are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: dirs::picture_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
                .unwrap_or_else(|| PathBuf::from("Pictures")),
            exclude_dirs: vec![".thumbnails".to_string()],
            extensions: vec!["jpg".to_string()],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("flickrsync")
                .join("flickrsync.db"),
        }
    }
}

impl Default for FlickrConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            request_delay_ms: 1000,
            upload_retry_delay_secs: 20,
            upload_tags: vec!["flickrsync".to_string()],
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_file: dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("flickrsync")
                .join("token.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"flickr.api_key"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        if !self.sync.root.exists() {
            errors.push(ValidationError {
                field: "sync.root".into(),
                message: format!("directory does not exist: {}", self.sync.root.display()),
            });
        }
        if self.sync.extensions.is_empty() {
            errors.push(ValidationError {
                field: "sync.extensions".into(),
                message: "must list at least one extension".into(),
            });
        }
        for ext in &self.sync.extensions {
            if ext.is_empty() || ext.starts_with('.') {
                errors.push(ValidationError {
                    field: "sync.extensions".into(),
                    message: format!("invalid extension '{ext}'; write it without the dot"),
                });
            }
        }

        // --- database ---
        if self.database.path.is_relative() {
            errors.push(ValidationError {
                field: "database.path".into(),
                message: "must be an absolute path".into(),
            });
        }

        // --- flickr ---
        if self.flickr.api_key.trim().is_empty() {
            errors.push(ValidationError {
                field: "flickr.api_key".into(),
                message: "must be set".into(),
            });
        }
        if self.flickr.api_secret.trim().is_empty() {
            errors.push(ValidationError {
                field: "flickr.api_secret".into(),
                message: "must be set".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use flickrsync_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .sync_root(PathBuf::from("/home/user/Pictures"))
///     .flickr_credentials("key", "secret")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sync ---

    pub fn sync_root(mut self, root: PathBuf) -> Self {
        self.config.sync.root = root;
        self
    }

    pub fn exclude_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.sync.exclude_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.sync.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    // --- database ---

    pub fn database_path(mut self, path: PathBuf) -> Self {
        self.config.database.path = path;
        self
    }

    // --- flickr ---

    pub fn flickr_credentials(
        mut self,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        self.config.flickr.api_key = api_key.into();
        self.config.flickr.api_secret = api_secret.into();
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.flickr.request_delay_ms = ms;
        self
    }

    pub fn upload_retry_delay_secs(mut self, secs: u64) -> Self {
        self.config.flickr.upload_retry_delay_secs = secs;
        self
    }

    // --- auth ---

    pub fn token_file(mut self, path: PathBuf) -> Self {
        self.config.auth.token_file = path;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(yaml: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert_eq!(cfg.sync.exclude_dirs, vec![".thumbnails".to_string()]);
        assert_eq!(cfg.sync.extensions, vec!["jpg".to_string()]);
        assert!(cfg.database.path.ends_with("flickrsync/flickrsync.db"));
        assert_eq!(cfg.flickr.request_delay_ms, 1000);
        assert_eq!(cfg.flickr.upload_retry_delay_secs, 20);
        assert_eq!(cfg.flickr.upload_tags, vec!["flickrsync".to_string()]);
        assert!(cfg.auth.token_file.ends_with("flickrsync/token.json"));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_only_misses_credentials() {
        let errors = Config::default().validate();
        let fields: Vec<_> = errors
            .iter()
            .map(|e| e.field.as_str())
            // sync.root may not exist on a CI/test machine
            .filter(|f| *f != "sync.root")
            .collect();
        assert_eq!(fields, vec!["flickr.api_key", "flickr.api_secret"]);
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let tmp = write_yaml(
            r#"
sync:
  root: /tmp/photos
  exclude_dirs: [".thumbnails", "private"]
  extensions: ["jpg", "jpeg"]
database:
  path: /tmp/flickrsync.db
flickr:
  api_key: "abc"
  api_secret: "def"
  request_delay_ms: 250
  upload_retry_delay_secs: 5
  upload_tags: ["holiday"]
auth:
  token_file: /tmp/token.json
logging:
  level: debug
"#,
        );

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.sync.root, PathBuf::from("/tmp/photos"));
        assert_eq!(cfg.sync.exclude_dirs, vec![".thumbnails", "private"]);
        assert_eq!(cfg.sync.extensions, vec!["jpg", "jpeg"]);
        assert_eq!(cfg.database.path, PathBuf::from("/tmp/flickrsync.db"));
        assert_eq!(cfg.flickr.api_key, "abc");
        assert_eq!(cfg.flickr.api_secret, "def");
        assert_eq!(cfg.flickr.request_delay_ms, 250);
        assert_eq!(cfg.flickr.upload_retry_delay_secs, 5);
        assert_eq!(cfg.flickr.upload_tags, vec!["holiday"]);
        assert_eq!(cfg.auth.token_file, PathBuf::from("/tmp/token.json"));
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn load_partial_yaml_fills_defaults() {
        let tmp = write_yaml(
            r#"
flickr:
  api_key: "abc"
"#,
        );

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.flickr.api_key, "abc");
        assert_eq!(cfg.flickr.request_delay_ms, 1000);
        assert_eq!(cfg.sync.extensions, vec!["jpg"]);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn load_expands_home_in_paths() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let tmp = write_yaml(
            r#"
sync:
  root: ~/Pictures
auth:
  token_file: ~/.config/flickrsync/token.json
"#,
        );

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.sync.root, home.join("Pictures"));
        assert_eq!(
            cfg.auth.token_file,
            home.join(".config/flickrsync/token.json")
        );
    }

    #[test]
    fn load_returns_error_on_missing_file() {
        let result = Config::load(Path::new("/nonexistent/flickrsync/config.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let tmp = write_yaml("flickr: [this is: not valid");
        assert!(Config::load(tmp.path()).is_err());
    }

    #[test]
    fn load_or_default_falls_back() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(cfg.flickr.request_delay_ms, 1000);
    }

    #[test]
    fn expand_home_leaves_absolute_paths_alone() {
        assert_eq!(
            expand_home(Path::new("/var/lib/photos")),
            PathBuf::from("/var/lib/photos")
        );
    }

    // -- Validation --

    #[test]
    fn validate_catches_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ConfigBuilder::new()
            .sync_root(dir.path().to_path_buf())
            .extensions([".jpg"])
            .database_path(PathBuf::from("relative.db"))
            .logging_level("verbose")
            .build();

        let fields: Vec<_> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"sync.extensions".to_string()));
        assert!(fields.contains(&"database.path".to_string()));
        assert!(fields.contains(&"flickr.api_key".to_string()));
        assert!(fields.contains(&"logging.level".to_string()));
        assert!(!fields.contains(&"sync.root".to_string()));
    }

    #[test]
    fn validate_rejects_empty_extension_list() {
        let dir = tempfile::tempdir().unwrap();
        let errors = ConfigBuilder::new()
            .sync_root(dir.path().to_path_buf())
            .flickr_credentials("k", "s")
            .extensions(Vec::<String>::new())
            .build()
            .validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "sync.extensions");
    }

    #[test]
    fn validate_reports_missing_root() {
        let errors = ConfigBuilder::new()
            .sync_root(PathBuf::from("/nonexistent/photo/library"))
            .flickr_credentials("k", "s")
            .build()
            .validate();
        assert!(errors.iter().any(|e| e.field == "sync.root"));
    }

    #[test]
    fn build_validated_accepts_complete_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ConfigBuilder::new()
            .sync_root(dir.path().to_path_buf())
            .database_path(dir.path().join("db.sqlite"))
            .flickr_credentials("key", "secret")
            .request_delay_ms(0)
            .build_validated()
            .expect("config should be valid");
        assert_eq!(cfg.flickr.request_delay_ms, 0);
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "flickr.api_key".into(),
            message: "must be set".into(),
        };
        assert_eq!(err.to_string(), "flickr.api_key: must be set");
    }
}
