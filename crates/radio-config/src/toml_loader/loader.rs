//! Reading `RadioConfig` from TOML.

use std::path::Path;

use radio_common::ConfigError;
use tracing::{info, warn};

use super::env::apply_env_overrides;
use super::paths::{create_default_config, default_config_path};
use crate::schema::RadioConfig;
use crate::validation;

pub(crate) fn parse_config(content: &str) -> Result<RadioConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("invalid TOML: {e}")))
}

/// Read `path`, fill gaps with defaults and apply environment overrides.
///
/// Out-of-range values are only logged here; `load_config` is the entry
/// point that rejects them.
pub fn load_from_path(path: &Path) -> Result<RadioConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        }
    };

    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config);

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), error = %e, "config has invalid values");
    }
    info!(path = %path.display(), "radio config loaded");
    Ok(config)
}

/// Load from [`default_config_path`], writing the default template first
/// when no file exists yet.
pub fn load_default() -> Result<RadioConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(&path)?;
            let mut config = RadioConfig::default();
            apply_env_overrides(&mut config);
            Ok(config)
        }
        other => other,
    }
}
