//! Radio service configuration.
//!
//! Provides TOML-based service configuration with validation and
//! environment overrides, plus the JSON store holding per-guild auto-join
//! settings. All config sections use defaults so partial configs work out
//! of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use radio_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

mod atomic;
pub mod autojoin;
pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

pub use autojoin::{
    AutoJoinConfig, AutoJoinEntry, AutoJoinStore, JsonAutoJoinStore, MemoryAutoJoinStore,
};
pub use schema::{RadioConfig, CONFIG_SCHEMA_VERSION};
pub use toml_writer::save_config_to_path;

use radio_common::ConfigError;
use std::path::Path;

/// Load and validate config from `path`, or from the platform default
/// location when `path` is `None` (creating a default file on first run).
pub fn load_config(path: Option<&Path>) -> Result<RadioConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &RadioConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
