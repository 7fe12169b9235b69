//! Audio source configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Station played when no `stream.url` or `RADIO_URL` is given.
pub const DEFAULT_STREAM_URL: &str = "http://radio.4duk.ru/4duk128.mp3";

/// Where the broadcast audio comes from and how it is decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Source URL handed to the decoder.
    pub url: String,
    /// Decoder executable.
    pub ffmpeg_path: String,
    /// Let the decoder reconnect to the source on its own before giving up.
    pub reconnect_input: bool,
    /// Settle time between a ready session and the first frame.
    pub start_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STREAM_URL.into(),
            ffmpeg_path: "ffmpeg".into(),
            reconnect_input: true,
            start_delay_ms: 1000,
        }
    }
}

impl StreamConfig {
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}
