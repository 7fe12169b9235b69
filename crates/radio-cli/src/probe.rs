//! Decode a few seconds of the station to check the audio path.

use std::io::ErrorKind;
use std::time::Duration;

use radio_common::RadioError;
use radio_config::RadioConfig;
use radio_core::audio::constants::{FRAME_DURATION, PCM_FRAME_BYTES};
use radio_core::{DecodeSource, FfmpegSource};
use tokio::io::AsyncReadExt;
use tokio::time::Instant;
use tracing::info;

/// Slack on top of the requested audio length for decoder startup.
const STARTUP_GRACE: Duration = Duration::from_secs(15);

/// Largest absolute sample in a frame of little-endian PCM.
fn frame_peak(pcm: &[u8]) -> u16 {
    pcm.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]).unsigned_abs())
        .max()
        .unwrap_or(0)
}

pub async fn run(config: &RadioConfig, url: Option<&str>, seconds: u64) -> Result<(), RadioError> {
    let url = url.unwrap_or(&config.stream.url);
    let source = FfmpegSource::from_config(&config.stream);
    info!(url, seconds, "probing station");

    let wanted = seconds.saturating_mul(1000) / FRAME_DURATION.as_millis() as u64;
    let started = Instant::now();
    let deadline = started + Duration::from_secs(seconds) + STARTUP_GRACE;

    let mut stream = source.open(url).await?;
    let mut pcm = vec![0u8; PCM_FRAME_BYTES];
    let mut frames: u64 = 0;
    let mut peak: u16 = 0;

    while frames < wanted {
        match tokio::time::timeout_at(deadline, stream.read_exact(&mut pcm)).await {
            Ok(Ok(_)) => {
                frames += 1;
                peak = peak.max(frame_peak(&pcm));
            }
            Ok(Err(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(RadioError::StreamEnded);
            }
            Ok(Err(e)) => return Err(RadioError::StreamRead(e.to_string())),
            Err(_) => {
                return Err(RadioError::Source(format!(
                    "only {frames} of {wanted} frames decoded before the deadline"
                )))
            }
        }
    }

    let audio = FRAME_DURATION * u32::try_from(frames).unwrap_or(u32::MAX);
    println!(
        "decoded {frames} frames ({audio:?} of audio) in {:?}, peak level {peak}",
        started.elapsed()
    );
    if peak == 0 {
        println!("warning: station is silent");
    }
    Ok(())
}
