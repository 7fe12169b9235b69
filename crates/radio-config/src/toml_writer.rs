//! Write RadioConfig to TOML on disk.

use std::path::Path;

use radio_common::ConfigError;

use crate::atomic::write_atomic;
use crate::schema::RadioConfig;

/// Write config to a specific path, creating parent directories as needed.
pub fn save_config_to_path(config: &RadioConfig, path: &Path) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::PersistError(format!("failed to serialize config to TOML: {e}")))?;

    write_atomic(path, &toml_str)?;

    tracing::debug!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EncoderProfile, LogLevel};
    use tempfile::TempDir;

    #[test]
    fn save_config_writes_valid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        save_config_to_path(&RadioConfig::default(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: RadioConfig = toml::from_str(&contents).unwrap();
        assert_eq!(parsed.reconnect.max_attempts, 5);
        assert_eq!(parsed.pipeline.send_timeout_ms, 100);
    }

    #[test]
    fn save_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = RadioConfig::default();
        config.stream.url = "http://example.test/stream".into();
        config.reconnect.abandon_when_empty = false;
        config.pipeline.encoder_profile = EncoderProfile::Voip;
        config.logging.level = LogLevel::Debug;
        save_config_to_path(&config, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: RadioConfig = toml::from_str(&contents).unwrap();

        assert_eq!(parsed.stream.url, config.stream.url);
        assert!(!parsed.reconnect.abandon_when_empty);
        assert_eq!(parsed.pipeline.encoder_profile, EncoderProfile::Voip);
        assert_eq!(parsed.logging.level, LogLevel::Debug);
        assert_eq!(
            parsed.persistence.auto_join_path,
            config.persistence.auto_join_path
        );
    }

    #[test]
    fn save_config_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("config.toml");

        save_config_to_path(&RadioConfig::default(), &path).unwrap();
        assert!(path.exists());
    }
}
