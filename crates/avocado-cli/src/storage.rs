use std::path::{Path, PathBuf};

use avocado::{Avocado, FileStoreConfig, StorageSpec};
use avocado_crypto::keygen::{PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};
use color_eyre::Result;
use dirs::data_dir;
use tracing::debug;

use crate::config::Config;

const DEFAULT_BUCKET: &str = "avocado";
const DEFAULT_DB_FILE: &str = "avocado.db";

/// Resolve the default data directory for Avocado.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("avocado"))
}

pub fn default_keys_dir() -> Result<PathBuf> {
    Ok(default_data_dir()?.join("keys"))
}

/// File store in the data directory, used when the config names no backend.
pub fn default_file_store(data_dir: &Path) -> FileStoreConfig {
    FileStoreConfig::new(data_dir.join(DEFAULT_DB_FILE), DEFAULT_BUCKET)
}

/// Storage spec from config, falling back to the default file store when neither backend is set.
pub fn spec_from_config(config: &Config, data_dir: &Path) -> StorageSpec {
    let spec = config.storage_spec();
    if spec.file.is_none() && spec.redis.is_none() {
        debug!(?data_dir, "no backend configured, using default file store");
        return StorageSpec {
            file: Some(default_file_store(data_dir)),
            redis: None,
        };
    }
    spec
}

/// Build the facade using config overrides.
pub fn open_from_config(config: &Config) -> Result<Avocado> {
    let spec = spec_from_config(config, &default_data_dir()?);
    Ok(Avocado::configure(spec)?)
}

/// Flag beats config, config beats `<data dir>/keys/public.pem`.
pub fn public_key_path(config: &Config, flag: Option<PathBuf>) -> Result<PathBuf> {
    resolve_key(flag, config.public_key.clone(), PUBLIC_KEY_FILE)
}

pub fn private_key_path(config: &Config, flag: Option<PathBuf>) -> Result<PathBuf> {
    resolve_key(flag, config.private_key.clone(), PRIVATE_KEY_FILE)
}

fn resolve_key(flag: Option<PathBuf>, configured: Option<PathBuf>, file: &str) -> Result<PathBuf> {
    match flag.or(configured) {
        Some(path) => Ok(path),
        None => Ok(default_keys_dir()?.join(file)),
    }
}
