//! Runtime configuration.
//!
//! Loaded from a TOML file (every field has a default), then overlaid with
//! environment variables. Store credentials only ever come from the
//! environment or the file; they are never logged.

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_USERNAME: &str = "ELASTICSEARCH_USERNAME";
pub const ENV_PASSWORD: &str = "ELASTICSEARCH_PASSWORD";
pub const ENV_STORE_URL: &str = "DOCRELAY_STORE_URL";
pub const ENV_PORT: &str = "DOCRELAY_PORT";

const DEFAULT_STORE_URL: &str = "https://elasticsearch.sistemafaeg.org.br:9200";
const DEFAULT_INDEX: &str = "meetup";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request bodies larger than this are rejected before the handler runs.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_url")]
    pub url: String,
    /// Index every document is created in and read from.
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Skip TLS certificate validation. Insecure; only for self-signed clusters.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            index: default_index(),
            username: None,
            password: None,
            accept_invalid_certs: false,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
    /// Remove the saved upload once its request completes.
    #[serde(default)]
    pub cleanup: bool,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
            cleanup: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            ansi: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}
fn default_store_url() -> String {
    DEFAULT_STORE_URL.to_string()
}
fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}
fn default_uploads_dir() -> String {
    "./uploads".to_string()
}
fn default_export_dir() -> String {
    ".".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

/// Basic-auth credentials for the store.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Config {
    /// Load from `path`, or from the per-user config file if one exists,
    /// falling back to defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Failed to parse config")
    }

    /// Overlay values from the environment, read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(user) = lookup(ENV_USERNAME) {
            self.store.username = Some(user);
        }
        if let Some(pass) = lookup(ENV_PASSWORD) {
            self.store.password = Some(pass);
        }
        if let Some(url) = lookup(ENV_STORE_URL) {
            self.store.url = url;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .parse()
                .with_context(|| format!("{ENV_PORT} is not a valid port: {port}"))?;
        }
        Ok(())
    }

    /// Credentials for the store; both halves are required.
    pub fn credentials(&self) -> Result<Credentials> {
        let (Some(username), Some(password)) = (&self.store.username, &self.store.password) else {
            bail!("Store credentials missing: set {ENV_USERNAME} and {ENV_PASSWORD}");
        };
        Ok(Credentials {
            username: username.clone(),
            password: password.clone(),
        })
    }

    pub fn uploads_dir(&self) -> PathBuf {
        expand(&self.uploads.dir)
    }

    pub fn export_dir(&self) -> PathBuf {
        expand(&self.export.dir)
    }

    /// TOML rendering with the password masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.store.password.is_some() {
            shown.store.password = Some("***".to_string());
        }
        toml::to_string_pretty(&shown).context("Failed to serialize config")
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// `<config dir>/config.toml` for this application, if a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "docrelay", "docrelay").map(|d| d.config_dir().join("config.toml"))
}
