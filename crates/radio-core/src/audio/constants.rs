//! Fixed audio format of the voice transport.

use std::time::Duration;

pub const SAMPLE_RATE: u32 = 48_000;
pub const CHANNELS: u16 = 2;

/// Samples per channel in one 20 ms frame.
pub const FRAME_SIZE: usize = 960;

/// Interleaved samples in one frame.
pub const FRAME_SAMPLES: usize = FRAME_SIZE * CHANNELS as usize;

/// Bytes of signed 16-bit little-endian PCM in one frame.
pub const PCM_FRAME_BYTES: usize = FRAME_SAMPLES * 2;

pub const FRAME_DURATION: Duration = Duration::from_millis(20);
