//! Decoder producing raw PCM from the station URL.

use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};

use async_trait::async_trait;
use radio_common::RadioError;
use radio_config::schema::StreamConfig;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, ReadBuf};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info};

use super::constants::{CHANNELS, SAMPLE_RATE};

/// Byte stream of signed 16-bit little-endian stereo PCM at 48 kHz.
pub type PcmStream = Box<dyn AsyncRead + Send + Unpin>;

/// Opens a decoded audio stream. Dropping the stream releases the decoder.
#[async_trait]
pub trait DecodeSource: Send + Sync {
    async fn open(&self, url: &str) -> Result<PcmStream, RadioError>;
}

/// Decoder arguments for `url`.
pub fn ffmpeg_args(url: &str, reconnect_input: bool) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    if reconnect_input {
        args.extend(
            [
                "-reconnect",
                "1",
                "-reconnect_streamed",
                "1",
                "-reconnect_delay_max",
                "5",
                "-reconnect_at_eof",
                "1",
            ]
            .map(String::from),
        );
    }
    args.extend(["-i".to_string(), url.to_string()]);
    args.extend(["-loglevel".to_string(), "warning".to_string()]);
    args.extend(["-f".to_string(), "s16le".to_string()]);
    args.extend(["-ar".to_string(), SAMPLE_RATE.to_string()]);
    args.extend(["-ac".to_string(), CHANNELS.to_string()]);
    args.push("-".to_string());
    args
}

// ---------------------------------------------------------------------------
// ffmpeg
// ---------------------------------------------------------------------------

/// Spawns an `ffmpeg` child process per stream.
#[derive(Debug, Clone)]
pub struct FfmpegSource {
    ffmpeg_path: String,
    reconnect_input: bool,
}

impl FfmpegSource {
    pub fn new(ffmpeg_path: impl Into<String>, reconnect_input: bool) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            reconnect_input,
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(config.ffmpeg_path.clone(), config.reconnect_input)
    }
}

#[async_trait]
impl DecodeSource for FfmpegSource {
    async fn open(&self, url: &str) -> Result<PcmStream, RadioError> {
        let mut child = Command::new(&self.ffmpeg_path)
            .args(ffmpeg_args(url, self.reconnect_input))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RadioError::Source(format!("failed to start {}: {e}", self.ffmpeg_path)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RadioError::Source("decoder stdout not captured".into()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "radio_core::ffmpeg", "{line}");
                }
            });
        }

        info!(pid = ?child.id(), "decoder started");
        Ok(Box::new(FfmpegStream {
            _child: child,
            stdout,
        }))
    }
}

/// Decoder stdout that owns its child; the process is killed on drop.
struct FfmpegStream {
    _child: Child,
    stdout: ChildStdout,
}

impl AsyncRead for FfmpegStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().stdout).poll_read(cx, buf)
    }
}
