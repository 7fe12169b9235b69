//! Frame delivery configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Codec application profile requested from the encoder provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum EncoderProfile {
    #[default]
    Audio,
    Voip,
    LowDelay,
}

/// Audio delivery pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Deadline for handing one encoded frame to the voice session.
    pub send_timeout_ms: u64,
    pub encoder_profile: EncoderProfile,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: 100,
            encoder_profile: EncoderProfile::Audio,
        }
    }
}

impl PipelineConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}
