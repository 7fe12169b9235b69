//! Decode, encode and send loop for one voice session.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use radio_common::{new_correlation_id, RadioError, TenantId};
use radio_config::schema::{PipelineConfig, StreamConfig};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::constants::{FRAME_SAMPLES, PCM_FRAME_BYTES};
use super::encoder_cache::{EncoderCache, SharedEncoder};
use super::source::{DecodeSource, PcmStream};
use crate::voice::shield::{caught, probe_status, shielded, shielded_sync};
use crate::voice::{SessionStatus, VoiceSession};

/// Streams the station into voice sessions.
///
/// One `run` call owns one decoder and lasts until the guild is
/// deactivated, the session stops being ready, the source fails, a frame
/// misses its send deadline, or the run is cancelled.
pub struct Pipeline {
    source: Arc<dyn DecodeSource>,
    encoders: Arc<EncoderCache>,
    url: String,
    start_delay: Duration,
    send_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn DecodeSource>,
        encoders: Arc<EncoderCache>,
        stream: &StreamConfig,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            source,
            encoders,
            url: stream.url.clone(),
            start_delay: stream.start_delay(),
            send_timeout: pipeline.send_timeout(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stream into `session` while `is_active` holds.
    ///
    /// Returns the number of frames delivered when the guild was
    /// deactivated. Every other exit is an error the caller may recover
    /// from.
    pub async fn run<F>(
        &self,
        tenant: &TenantId,
        session: &Arc<dyn VoiceSession>,
        is_active: F,
        cancel: &CancellationToken,
    ) -> Result<u64, RadioError>
    where
        F: Fn() -> bool + Send + Sync,
    {
        let run_id = new_correlation_id();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RadioError::Cancelled),
            _ = tokio::time::sleep(self.start_delay) => {}
        }

        if probe_status(session) != SessionStatus::Ready {
            warn!(tenant = %tenant, run = %run_id, "voice connection not ready, aborting stream");
            return Err(RadioError::SessionNotReady);
        }

        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RadioError::Cancelled),
            opened = caught("open", self.source.open(&self.url)) => opened??,
        };

        if let Err(e) = shielded("set_speaking", session.set_speaking(true)).await {
            warn!(tenant = %tenant, run = %run_id, error = %e, "failed to set speaking state");
        }
        info!(tenant = %tenant, run = %run_id, url = %self.url, "streaming started");

        let result = self
            .pump(tenant, &run_id, session, &mut stream, &is_active, cancel)
            .await;
        drop(stream);

        if let Err(e) = shielded("set_speaking", session.set_speaking(false)).await {
            debug!(tenant = %tenant, run = %run_id, error = %e, "failed to clear speaking state");
        }
        result
    }

    async fn pump<F>(
        &self,
        tenant: &TenantId,
        run_id: &str,
        session: &Arc<dyn VoiceSession>,
        stream: &mut PcmStream,
        is_active: &F,
        cancel: &CancellationToken,
    ) -> Result<u64, RadioError>
    where
        F: Fn() -> bool + Send + Sync,
    {
        let mut pcm = vec![0u8; PCM_FRAME_BYTES];
        let mut samples = vec![0i16; FRAME_SAMPLES];
        let mut encoder: Option<SharedEncoder> = None;
        let mut frames: u64 = 0;

        loop {
            if !is_active() {
                info!(tenant = %tenant, run = %run_id, frames, "radio deactivated, stopping stream");
                return Ok(frames);
            }
            if probe_status(session) != SessionStatus::Ready {
                warn!(tenant = %tenant, run = %run_id, frames, "voice connection lost during streaming");
                return Err(RadioError::SessionNotReady);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RadioError::Cancelled),
                read = caught("read", stream.read_exact(&mut pcm)) => match read? {
                    Ok(_) => {}
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                        info!(tenant = %tenant, run = %run_id, frames, "audio stream ended");
                        return Err(RadioError::StreamEnded);
                    }
                    Err(e) => {
                        warn!(tenant = %tenant, run = %run_id, error = %e, "error reading audio data");
                        return Err(RadioError::StreamRead(e.to_string()));
                    }
                },
            }

            for (sample, bytes) in samples.iter_mut().zip(pcm.chunks_exact(2)) {
                *sample = i16::from_le_bytes([bytes[0], bytes[1]]);
            }

            let shared = match &encoder {
                Some(shared) => Arc::clone(shared),
                None => {
                    let shared = self.encoders.get_or_create(tenant)?;
                    encoder = Some(Arc::clone(&shared));
                    shared
                }
            };
            let packet = {
                let mut guard = shared.lock().unwrap_or_else(|e| e.into_inner());
                shielded_sync("encode", || guard.encode(&samples))?
                    .map_err(|e| RadioError::Encoder(e.to_string()))?
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RadioError::Cancelled),
                sent = tokio::time::timeout(
                    self.send_timeout,
                    shielded("send_frame", session.send_frame(packet)),
                ) => match sent {
                    Ok(Ok(())) => frames += 1,
                    Ok(Err(e)) => return Err(e),
                    Err(_) => {
                        warn!(tenant = %tenant, run = %run_id, timeout = ?self.send_timeout, "timed out sending audio frame");
                        return Err(RadioError::SendTimeout(self.send_timeout));
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use radio_common::ChannelId;
    use radio_config::schema::EncoderProfile;

    use super::*;
    use crate::testing::{FakeCodec, FakeSession, MemorySource};

    struct Fixture {
        pipeline: Pipeline,
        codec: Arc<FakeCodec>,
        source: Arc<MemorySource>,
        session: Arc<FakeSession>,
    }

    fn fixture(source: MemorySource) -> Fixture {
        let codec = Arc::new(FakeCodec::default());
        let source = Arc::new(source);
        let encoders = Arc::new(EncoderCache::new(codec.clone(), EncoderProfile::Audio));
        let pipeline = Pipeline::new(
            source.clone(),
            encoders,
            &StreamConfig::default(),
            &PipelineConfig::default(),
        );
        Fixture {
            pipeline,
            codec,
            source,
            session: FakeSession::ready(ChannelId::from("vc")),
        }
    }

    fn tenant() -> TenantId {
        TenantId::from("g1")
    }

    #[tokio::test(start_paused = true)]
    async fn end_of_stream_is_reported() {
        let fx = fixture(MemorySource::with_frames(5));
        let session: Arc<dyn VoiceSession> = fx.session.clone();

        let err = fx
            .pipeline
            .run(&tenant(), &session, || true, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RadioError::StreamEnded));
        assert_eq!(fx.session.frames(), 5);
        assert_eq!(fx.session.speaking_history(), vec![true, false]);
        assert_eq!(fx.codec.created(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn crashing_decoder_start_is_an_error() {
        let source = MemorySource::endless();
        source.panic_next_opens(1);
        let fx = fixture(source);
        let session: Arc<dyn VoiceSession> = fx.session.clone();

        let err = fx
            .pipeline
            .run(&tenant(), &session, || true, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RadioError::Collaborator(ref m) if m.contains("decoder failed to start")));
        assert!(fx.session.speaking_history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn crashing_decoder_read_clears_speaking() {
        let source = MemorySource::endless();
        source.panic_next_reads(1);
        let fx = fixture(source);
        let session: Arc<dyn VoiceSession> = fx.session.clone();

        let err = fx
            .pipeline
            .run(&tenant(), &session, || true, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RadioError::Collaborator(ref m) if m.contains("mid-read")));
        assert_eq!(fx.session.speaking_history(), vec![true, false]);
        assert_eq!(fx.session.frames(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deactivation_ends_run_cleanly() {
        let fx = fixture(MemorySource::endless());
        let session: Arc<dyn VoiceSession> = fx.session.clone();
        let active = Arc::new(AtomicBool::new(true));

        let flag = active.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            flag.store(false, Ordering::SeqCst);
        });

        let frames = fx
            .pipeline
            .run(
                &tenant(),
                &session,
                || active.load(Ordering::SeqCst),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(frames > 0);
        assert_eq!(frames as usize, fx.session.frames());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_session_stops_run() {
        let fx = fixture(MemorySource::endless());
        let session: Arc<dyn VoiceSession> = fx.session.clone();

        let victim = fx.session.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            victim.kill();
        });

        let err = fx
            .pipeline
            .run(&tenant(), &session, || true, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RadioError::SessionNotReady | RadioError::Collaborator(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn session_not_ready_never_opens_source() {
        let fx = fixture(MemorySource::endless());
        let connecting = FakeSession::connecting(ChannelId::from("vc"));
        let session: Arc<dyn VoiceSession> = connecting;

        let err = fx
            .pipeline
            .run(&tenant(), &session, || true, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RadioError::SessionNotReady));
        assert_eq!(fx.source.opens(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn congested_sink_times_out() {
        let fx = fixture(MemorySource::endless());
        fx.session.set_send_delay(Duration::from_millis(250));
        let session: Arc<dyn VoiceSession> = fx.session.clone();

        let err = fx
            .pipeline
            .run(&tenant(), &session, || true, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RadioError::SendTimeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_run() {
        let fx = fixture(MemorySource::endless());
        let session: Arc<dyn VoiceSession> = fx.session.clone();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });

        let err = fx
            .pipeline
            .run(&tenant(), &session, || true, &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(fx.session.speaking_history(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn source_failure_is_reported() {
        let fx = fixture(MemorySource::endless());
        fx.source.fail_opens(true);
        let session: Arc<dyn VoiceSession> = fx.session.clone();

        let err = fx
            .pipeline
            .run(&tenant(), &session, || true, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RadioError::Source(_)));
        assert_eq!(fx.session.frames(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn send_error_is_contained() {
        let fx = fixture(MemorySource::endless());
        fx.session.fail_sends(true);
        let session: Arc<dyn VoiceSession> = fx.session.clone();

        let err = fx
            .pipeline
            .run(&tenant(), &session, || true, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RadioError::Collaborator(_)));
    }
}
