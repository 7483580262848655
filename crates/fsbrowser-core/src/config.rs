//! Browser configuration.
//!
//! Stored as camelCase JSON. Every field has a default, so an empty object
//! (or no file at all) is a valid configuration. Hosts layer environment
//! overrides on top with [`BrowserConfig::apply_env`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::FsPath;

/// Environment variable naming the JSON configuration file.
pub const ENV_CONFIG: &str = "FSBROWSER_CONFIG";

/// Environment variable overriding [`BrowserConfig::root`].
pub const ENV_ROOT: &str = "FSBROWSER_ROOT";

/// Environment variable overriding [`BrowserConfig::http_port`].
pub const ENV_PORT: &str = "FSBROWSER_PORT";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Invalid editor page: {0}")]
    EditorPage(String),

    #[error("Index page must be a bare file name: {0}")]
    IndexPage(String),
}

/// File browser settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserConfig {
    /// Server name, used in logs.
    pub name: String,

    /// Address to bind to.
    pub bind_address: String,

    /// HTTP port.
    pub http_port: u16,

    /// Directory served as `/`.
    pub root: PathBuf,

    /// Page served by `GET /edit`.
    pub editor_page: String,

    /// File appended to paths ending in `/`.
    pub index_page: String,

    /// Create missing parent directories when writing files.
    pub create_parent_dirs: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            name: "fsbrowser".to_string(),
            bind_address: "0.0.0.0".to_string(),
            http_port: 8080,
            root: PathBuf::from("data"),
            editor_page: "/edit.htm".to_string(),
            index_page: "index.htm".to_string(),
            create_parent_dirs: true,
        }
    }
}

impl BrowserConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from the file named by `FSBROWSER_CONFIG` (defaults if unset),
    /// then apply environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(ENV_CONFIG) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `FSBROWSER_ROOT` and `FSBROWSER_PORT` overrides from `lookup`.
    pub fn apply_env<L>(&mut self, lookup: L) -> Result<(), ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_ROOT) {
            self.root = PathBuf::from(root);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.http_port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_PORT,
                value: port,
            })?;
        }
        Ok(())
    }

    /// Check the page settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.editor_path()?;
        if self.index_page.is_empty() || self.index_page.contains('/') {
            return Err(ConfigError::IndexPage(self.index_page.clone()));
        }
        Ok(())
    }

    /// The editor page as a filesystem path.
    pub fn editor_path(&self) -> Result<FsPath, ConfigError> {
        match FsPath::new(&self.editor_page) {
            Ok(path) if !path.is_dir_marker() => Ok(path),
            Ok(_) => Err(ConfigError::EditorPage(self.editor_page.clone())),
            Err(e) => Err(ConfigError::EditorPage(e.to_string())),
        }
    }

    /// `bind_address:http_port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }
}
