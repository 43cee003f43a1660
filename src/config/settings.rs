use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub repository: RepositorySettings,
    pub url: UrlSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositorySettings {
    /// Root of the dists tree to scan for metadata files.
    pub dists: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UrlSettings {
    /// Base URL prepended to a record's Filename to form download links.
    pub repo: String,
    /// Base URL prepended to a package name to form info links.
    pub info: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> SocketAddr {
    ([0, 0, 0, 0], 8080).into()
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

        info!("Settings loaded from {}", path.display());
        Ok(settings)
    }
}
