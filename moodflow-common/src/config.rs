//! Configuration loading and credential resolution
//!
//! Settings resolve through three tiers, highest priority first:
//! 1. Environment variables (`MOODFLOW_*`)
//! 2. TOML config file (`--config` path, `$MOODFLOW_CONFIG`, or the
//!    platform config directory)
//! 3. Compiled defaults
//!
//! Catalog credentials live in an explicit [`CatalogConfig`] handed to the
//! client constructors; nothing reads credential globals at import time.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8787;
const DEFAULT_SAMPLE_RATE: u32 = 22050;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Scopes requested for the authorization-code flow: profile read plus
/// playlist write access.
pub const DEFAULT_SCOPES: &str = "user-read-private user-read-email \
     playlist-modify-private playlist-modify-public user-library-read";

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Catalog service credentials and OAuth parameters.
///
/// Constructed once during startup and passed to the catalog clients;
/// lifecycle is scoped to the client instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Fixed local redirect for the authorization-code flow
    pub redirect_uri: String,
    /// Space-separated OAuth scopes
    pub scopes: String,
    /// Market hint passed to catalog searches
    pub market: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: format!("http://{DEFAULT_HOST}:{DEFAULT_PORT}/auth/callback"),
            scopes: DEFAULT_SCOPES.to_string(),
            market: "US".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Whether both credentials are present (non-empty, non-whitespace)
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

/// Audio analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Analysis sample rate; uploads are resampled to this before extraction
    pub sample_rate: u32,
    /// Upload size cap enforced by the HTTP layer
    pub max_upload_bytes: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Session history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Path of the JSON-array history file
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_data_dir().join("history").join("sessions.json"),
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub audio: AudioConfig,
    pub history: HistoryConfig,
}

impl AppConfig {
    /// Resolve configuration from the three tiers.
    ///
    /// `cli_config` is the `--config` argument when given; otherwise the
    /// file is looked up via `$MOODFLOW_CONFIG` and the platform config
    /// directory. A missing file is not an error (defaults apply); an
    /// unreadable or unparsable file is.
    pub fn resolve(cli_config: Option<&Path>) -> Result<Self> {
        let mut config = match locate_config_file(cli_config) {
            Some(path) => {
                info!(path = %path.display(), "Loading config file");
                Self::from_toml_file(&path)?
            }
            None => {
                info!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config failed: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Parse config failed: {e}")))
    }

    /// Apply `MOODFLOW_*` environment overrides (highest priority tier)
    fn apply_env_overrides(&mut self) {
        let mut credential_sources = Vec::new();
        if self.catalog.is_configured() {
            credential_sources.push("config file");
        }

        if let Ok(id) = std::env::var("MOODFLOW_CLIENT_ID") {
            if !id.trim().is_empty() {
                self.catalog.client_id = id;
                credential_sources.push("environment");
            }
        }
        if let Ok(secret) = std::env::var("MOODFLOW_CLIENT_SECRET") {
            if !secret.trim().is_empty() {
                self.catalog.client_secret = secret;
            }
        }
        if credential_sources.len() > 1 {
            warn!(
                "Catalog credentials found in multiple sources: {}. Using environment (highest priority).",
                credential_sources.join(", ")
            );
        }

        if let Ok(uri) = std::env::var("MOODFLOW_REDIRECT_URI") {
            if !uri.trim().is_empty() {
                self.catalog.redirect_uri = uri;
            }
        }
        if let Ok(path) = std::env::var("MOODFLOW_HISTORY_PATH") {
            if !path.trim().is_empty() {
                self.history.path = PathBuf::from(path);
            }
        }
        if let Ok(port) = std::env::var("MOODFLOW_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid MOODFLOW_PORT"),
            }
        }
    }
}

/// Locate the config file: CLI arg, then env var, then platform default
fn locate_config_file(cli_config: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_config {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("MOODFLOW_CONFIG") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        warn!(path = %path.display(), "MOODFLOW_CONFIG points at a missing file");
    }

    let default = dirs::config_dir()?.join("moodflow").join("config.toml");
    default.exists().then_some(default)
}

/// Platform data directory for history and other local state
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("moodflow"))
        .unwrap_or_else(|| PathBuf::from("./moodflow_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.audio.sample_rate, 22050);
        assert!(!config.catalog.is_configured());
        assert!(config.catalog.redirect_uri.ends_with("/auth/callback"));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[catalog]
client_id = "abc"
client_secret = "def"

[server]
port = 9999
"#,
        )
        .unwrap();

        let config = AppConfig::from_toml_file(&path).unwrap();
        assert!(config.catalog.is_configured());
        assert_eq!(config.server.port, 9999);
        // untouched sections keep their defaults
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.audio.sample_rate, 22050);
    }

    #[test]
    fn unparsable_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml [[[").unwrap();
        assert!(AppConfig::from_toml_file(&path).is_err());
    }

    #[test]
    fn blank_credentials_are_not_configured() {
        let mut config = CatalogConfig::default();
        config.client_id = "  ".to_string();
        config.client_secret = "x".to_string();
        assert!(!config.is_configured());
    }
}
