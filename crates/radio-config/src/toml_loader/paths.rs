//! Where the service config lives, and first-run creation of it.

use std::path::{Path, PathBuf};

use radio_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;
use crate::atomic::write_atomic;

/// Points the service at a config file outside the platform config dir.
pub const CONFIG_PATH_ENV: &str = "RADIO_CONFIG";

/// `$RADIO_CONFIG` when set, else `<config dir>/radio/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    resolve_config_path(|key| std::env::var(key).ok(), dirs::config_dir())
}

pub(crate) fn resolve_config_path<F>(
    lookup: F,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(explicit) = lookup(CONFIG_PATH_ENV).filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(explicit));
    }
    config_dir
        .map(|dir| dir.join("radio").join("config.toml"))
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))
}

/// Write the commented default template to `path`.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    write_atomic(path, &default_config_toml())?;
    info!(path = %path.display(), "wrote default radio config");
    Ok(())
}
