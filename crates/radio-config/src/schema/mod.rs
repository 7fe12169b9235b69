//! Configuration schema types for the radio service.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Durations are stored as integer milliseconds or seconds and exposed
//! through `Duration` accessors.

mod connection;
mod pipeline;
mod stream;
mod system;

pub use connection::*;
pub use pipeline::*;
pub use stream::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for the radio service.
///
/// Every option has a default matching the production bot, so an empty
/// file is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct RadioConfig {
    pub stream: StreamConfig,
    pub connection: ConnectionConfig,
    pub reconnect: ReconnectConfig,
    pub health: HealthConfig,
    pub pipeline: PipelineConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
    pub shutdown: ShutdownConfig,
}
