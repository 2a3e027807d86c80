use std::{
    fs,
    path::{Path, PathBuf},
};

use avocado::{FileStoreConfig, RedisStoreConfig, StorageSpec};
use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

/// User-level configuration loaded from `~/.config/avocado/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Default public key for `store`.
    pub public_key: Option<PathBuf>,
    /// Default private key for `find`.
    pub private_key: Option<PathBuf>,
    /// Embedded file store; mutually exclusive with `redis`.
    pub file: Option<FileStoreConfig>,
    /// Networked store; mutually exclusive with `file`.
    pub redis: Option<RedisStoreConfig>,
}

impl Config {
    pub fn storage_spec(&self) -> StorageSpec {
        StorageSpec {
            file: self.file.clone(),
            redis: self.redis.clone(),
        }
    }
}

/// Load config from the default path or an explicit override; if missing, return defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_from_path(path),
        None => load_from_path(default_path()?),
    }
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("avocado").join("config.toml"))
}

/// Write the given config unless a file already exists at `path`, creating parent directories.
pub fn write_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}
