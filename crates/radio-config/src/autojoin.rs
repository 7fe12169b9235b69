//! Per-guild auto-join settings persisted as JSON.
//!
//! The file maps guild id to `{auto_channel_id, auto_connect_enabled}`. An
//! unset channel is written as an empty string so files produced by older
//! deployments load unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use radio_common::{ChannelId, ConfigError, TenantId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::atomic::write_atomic;

/// Saved auto-join settings for one guild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoJoinEntry {
    #[serde(
        default,
        serialize_with = "serialize_channel",
        deserialize_with = "deserialize_channel"
    )]
    pub auto_channel_id: Option<ChannelId>,
    #[serde(default)]
    pub auto_connect_enabled: bool,
}

/// Sorted so that saving the same settings twice yields identical bytes.
pub type AutoJoinConfig = BTreeMap<TenantId, AutoJoinEntry>;

fn serialize_channel<S: Serializer>(
    channel: &Option<ChannelId>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(channel.as_ref().map(ChannelId::as_str).unwrap_or(""))
}

fn deserialize_channel<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ChannelId>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(ChannelId::from))
}

/// Load/save contract for auto-join settings.
pub trait AutoJoinStore: Send + Sync {
    fn load(&self) -> Result<AutoJoinConfig, ConfigError>;
    fn save(&self, config: &AutoJoinConfig) -> Result<(), ConfigError>;
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// Auto-join settings in a pretty-printed JSON file.
///
/// Saves through one store are serialized, so each completed `save` leaves
/// the file holding exactly the map it was given.
#[derive(Debug)]
pub struct JsonAutoJoinStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonAutoJoinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AutoJoinStore for JsonAutoJoinStore {
    /// A missing file is an empty configuration.
    fn load(&self) -> Result<AutoJoinConfig, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no auto-join file yet");
                return Ok(AutoJoinConfig::new());
            }
            Err(e) => {
                return Err(ConfigError::ParseError(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        let config: AutoJoinConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::ParseError(format!("failed to parse {}: {e}", self.path.display()))
        })?;

        info!(path = %self.path.display(), guilds = config.len(), "loaded auto-join settings");
        Ok(config)
    }

    fn save(&self, config: &AutoJoinConfig) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config).map_err(|e| {
            ConfigError::PersistError(format!("failed to serialize auto-join settings: {e}"))
        })?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        write_atomic(&self.path, &json)?;
        debug!(path = %self.path.display(), guilds = config.len(), "auto-join settings saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Non-persistent store for embedding hosts that keep settings elsewhere,
/// and for tests.
#[derive(Debug, Default)]
pub struct MemoryAutoJoinStore {
    config: Mutex<AutoJoinConfig>,
    saves: Mutex<usize>,
}

impl MemoryAutoJoinStore {
    pub fn new(initial: AutoJoinConfig) -> Self {
        Self {
            config: Mutex::new(initial),
            saves: Mutex::new(0),
        }
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AutoJoinStore for MemoryAutoJoinStore {
    fn load(&self) -> Result<AutoJoinConfig, ConfigError> {
        Ok(self.config.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, config: &AutoJoinConfig) -> Result<(), ConfigError> {
        *self.config.lock().unwrap_or_else(|e| e.into_inner()) = config.clone();
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}
