//! In-memory collaborators for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use radio_common::{ChannelId, RadioError, TenantId};
use radio_config::schema::EncoderProfile;
use radio_config::{AutoJoinConfig, MemoryAutoJoinStore, RadioConfig};
use tokio::io::AsyncReadExt;

use crate::audio::constants::{FRAME_DURATION, PCM_FRAME_BYTES};
use crate::audio::{Codec, CodecError, DecodeSource, FrameEncoder, PcmStream};
use crate::radio::{Collaborators, Radio};
use crate::voice::{SessionStatus, VoiceError, VoiceProvider, VoiceSession};

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

pub(crate) struct FakeSession {
    channel: ChannelId,
    status: Mutex<SessionStatus>,
    frames: AtomicUsize,
    speaking: Mutex<Vec<bool>>,
    disconnects: AtomicUsize,
    send_delay: Mutex<Duration>,
    fail_sends: AtomicBool,
    panic_on_disconnect: AtomicBool,
}

impl FakeSession {
    fn with_status(channel: ChannelId, status: SessionStatus) -> Arc<Self> {
        Arc::new(Self {
            channel,
            status: Mutex::new(status),
            frames: AtomicUsize::new(0),
            speaking: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
            send_delay: Mutex::new(FRAME_DURATION),
            fail_sends: AtomicBool::new(false),
            panic_on_disconnect: AtomicBool::new(false),
        })
    }

    pub fn ready(channel: ChannelId) -> Arc<Self> {
        Self::with_status(channel, SessionStatus::Ready)
    }

    pub fn connecting(channel: ChannelId) -> Arc<Self> {
        Self::with_status(channel, SessionStatus::Connecting)
    }

    pub fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn kill(&self) {
        self.set_status(SessionStatus::Closed);
    }

    pub fn is_closed(&self) -> bool {
        *self.status.lock().unwrap() == SessionStatus::Closed
    }

    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }

    pub fn speaking_history(&self) -> Vec<bool> {
        self.speaking.lock().unwrap().clone()
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn set_send_delay(&self, delay: Duration) {
        *self.send_delay.lock().unwrap() = delay;
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn panic_on_disconnect(&self, panic: bool) {
        self.panic_on_disconnect.store(panic, Ordering::SeqCst);
    }
}

#[async_trait]
impl VoiceSession for FakeSession {
    fn status(&self) -> SessionStatus {
        *self.status.lock().unwrap()
    }

    fn channel_id(&self) -> Option<ChannelId> {
        Some(self.channel.clone())
    }

    async fn set_speaking(&self, speaking: bool) -> Result<(), VoiceError> {
        self.speaking.lock().unwrap().push(speaking);
        Ok(())
    }

    async fn send_frame(&self, _frame: Vec<u8>) -> Result<(), VoiceError> {
        if self.status() != SessionStatus::Ready {
            return Err(VoiceError::Closed);
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(VoiceError::Transport("udp write failed".into()));
        }
        let delay = *self.send_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), VoiceError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.kill();
        if self.panic_on_disconnect.load(Ordering::SeqCst) {
            panic!("disconnect raced gateway close");
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeProvider {
    registry: Mutex<HashMap<TenantId, Arc<FakeSession>>>,
    created: Mutex<Vec<(TenantId, Arc<FakeSession>)>>,
    joins: AtomicUsize,
    fail_joins: AtomicUsize,
    panic_joins: AtomicUsize,
    never_ready: AtomicBool,
    ready_delay: Mutex<Option<Duration>>,
    listeners: Mutex<HashMap<(TenantId, ChannelId), usize>>,
}

impl FakeProvider {
    pub fn joins(&self) -> usize {
        self.joins.load(Ordering::SeqCst)
    }

    pub fn fail_next_joins(&self, n: usize) {
        self.fail_joins.store(n, Ordering::SeqCst);
    }

    pub fn panic_next_joins(&self, n: usize) {
        self.panic_joins.store(n, Ordering::SeqCst);
    }

    pub fn set_never_ready(&self, never: bool) {
        self.never_ready.store(never, Ordering::SeqCst);
    }

    pub fn set_ready_delay(&self, delay: Option<Duration>) {
        *self.ready_delay.lock().unwrap() = delay;
    }

    pub fn set_listeners(&self, tenant: &TenantId, channel: &ChannelId, count: usize) {
        self.listeners
            .lock()
            .unwrap()
            .insert((tenant.clone(), channel.clone()), count);
    }

    /// Registered session, concretely typed.
    pub fn current(&self, tenant: &TenantId) -> Option<Arc<FakeSession>> {
        self.registry.lock().unwrap().get(tenant).cloned()
    }

    /// Register a session without going through `join`.
    pub fn register(&self, tenant: &TenantId, session: Arc<FakeSession>) {
        self.registry.lock().unwrap().insert(tenant.clone(), session);
    }

    /// Sessions ever created for `tenant` that are not closed.
    pub fn live_sessions(&self, tenant: &TenantId) -> usize {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, s)| t == tenant && !s.is_closed())
            .count()
    }

    /// Drop the current session from under the core, as a network failure
    /// would.
    pub fn kill(&self, tenant: &TenantId) {
        if let Some(session) = self.current(tenant) {
            session.kill();
        }
    }
}

#[async_trait]
impl VoiceProvider for FakeProvider {
    async fn join(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
        _timeout: Duration,
    ) -> Result<Arc<dyn VoiceSession>, VoiceError> {
        self.joins.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;

        if take_one(&self.fail_joins) {
            return Err(VoiceError::Join("gateway refused".into()));
        }
        if take_one(&self.panic_joins) {
            panic!("voice state map written concurrently");
        }

        let ready_delay = *self.ready_delay.lock().unwrap();
        let session = if self.never_ready.load(Ordering::SeqCst) {
            FakeSession::connecting(channel.clone())
        } else if let Some(delay) = ready_delay {
            let session = FakeSession::connecting(channel.clone());
            let pending = Arc::clone(&session);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if !pending.is_closed() {
                    pending.set_status(SessionStatus::Ready);
                }
            });
            session
        } else {
            FakeSession::ready(channel.clone())
        };

        if let Some(previous) = self
            .registry
            .lock()
            .unwrap()
            .insert(tenant.clone(), Arc::clone(&session))
        {
            previous.kill();
        }
        self.created
            .lock()
            .unwrap()
            .push((tenant.clone(), Arc::clone(&session)));
        Ok(session)
    }

    fn session(&self, tenant: &TenantId) -> Option<Arc<dyn VoiceSession>> {
        self.current(tenant).map(|s| s as Arc<dyn VoiceSession>)
    }

    fn remove(&self, tenant: &TenantId) -> Option<Arc<dyn VoiceSession>> {
        self.registry
            .lock()
            .unwrap()
            .remove(tenant)
            .map(|s| s as Arc<dyn VoiceSession>)
    }

    fn listener_count(&self, tenant: &TenantId, channel: &ChannelId) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .get(&(tenant.clone(), channel.clone()))
            .copied()
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Default)]
enum CodecMode {
    #[default]
    Working,
    Failing,
    Panicking,
}

#[derive(Default)]
pub(crate) struct FakeCodec {
    mode: CodecMode,
    created: AtomicUsize,
}

impl FakeCodec {
    pub fn failing() -> Self {
        Self {
            mode: CodecMode::Failing,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            mode: CodecMode::Panicking,
            ..Self::default()
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

struct FakeEncoder;

impl FrameEncoder for FakeEncoder {
    fn encode(&mut self, pcm: &[i16]) -> Result<Vec<u8>, CodecError> {
        Ok(pcm.iter().take(4).flat_map(|s| s.to_le_bytes()).collect())
    }
}

impl Codec for FakeCodec {
    fn new_encoder(
        &self,
        _sample_rate: u32,
        _channels: u16,
        _profile: EncoderProfile,
    ) -> Result<Box<dyn FrameEncoder>, CodecError> {
        match self.mode {
            CodecMode::Working => {
                self.created.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(FakeEncoder))
            }
            CodecMode::Failing => Err(CodecError("unsupported sample rate".into())),
            CodecMode::Panicking => panic!("encoder library aborted"),
        }
    }
}

/// Decoder whose reads panic, like a crashed native decoder.
struct CrashingReader;

impl tokio::io::AsyncRead for CrashingReader {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        _buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        panic!("decoder crashed mid-read")
    }
}

pub(crate) struct MemorySource {
    frames: Option<usize>,
    opens: AtomicUsize,
    fail: AtomicBool,
    panic_opens: AtomicUsize,
    panic_reads: AtomicUsize,
}

impl MemorySource {
    pub fn endless() -> Self {
        Self {
            frames: None,
            opens: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            panic_opens: AtomicUsize::new(0),
            panic_reads: AtomicUsize::new(0),
        }
    }

    pub fn with_frames(frames: usize) -> Self {
        Self {
            frames: Some(frames),
            ..Self::endless()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn fail_opens(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// The next `n` opens panic.
    pub fn panic_next_opens(&self, n: usize) {
        self.panic_opens.store(n, Ordering::SeqCst);
    }

    /// The next `n` opened streams panic on their first read.
    pub fn panic_next_reads(&self, n: usize) {
        self.panic_reads.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl DecodeSource for MemorySource {
    async fn open(&self, _url: &str) -> Result<PcmStream, RadioError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.panic_opens) {
            panic!("decoder failed to start");
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(RadioError::Source("station offline".into()));
        }
        if take_one(&self.panic_reads) {
            return Ok(Box::new(CrashingReader));
        }
        Ok(match self.frames {
            Some(frames) => Box::new(tokio::io::repeat(1).take((frames * PCM_FRAME_BYTES) as u64)),
            None => Box::new(tokio::io::repeat(1)),
        })
    }
}

// ---------------------------------------------------------------------------
// Radio harness
// ---------------------------------------------------------------------------

pub(crate) struct Harness {
    pub radio: Radio,
    pub provider: Arc<FakeProvider>,
    pub codec: Arc<FakeCodec>,
    pub source: Arc<MemorySource>,
    pub auto_join: Arc<MemoryAutoJoinStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(RadioConfig::default(), AutoJoinConfig::new())
    }

    pub fn with(config: RadioConfig, saved: AutoJoinConfig) -> Self {
        let provider = Arc::new(FakeProvider::default());
        let codec = Arc::new(FakeCodec::default());
        let source = Arc::new(MemorySource::endless());
        let auto_join = Arc::new(MemoryAutoJoinStore::new(saved));
        let radio = Radio::new(
            config,
            Collaborators {
                voice: provider.clone(),
                codec: codec.clone(),
                source: source.clone(),
                auto_join: auto_join.clone(),
            },
        );
        Self {
            radio,
            provider,
            codec,
            source,
            auto_join,
        }
    }
}

/// Let spawned tasks run for `secs` of (paused) time.
pub(crate) async fn settle(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

pub(crate) fn tenant() -> TenantId {
    TenantId::from("g1")
}

pub(crate) fn channel(id: &str) -> ChannelId {
    ChannelId::from(id)
}

pub(crate) fn config_with(edit: impl FnOnce(&mut RadioConfig)) -> RadioConfig {
    let mut config = RadioConfig::default();
    edit(&mut config);
    config
}

/// Saved settings enabling auto-join of `channel` for [`tenant`].
pub(crate) fn saved_auto_join(channel_id: &str) -> AutoJoinConfig {
    let mut saved = AutoJoinConfig::new();
    saved.insert(
        tenant(),
        radio_config::AutoJoinEntry {
            auto_channel_id: Some(channel(channel_id)),
            auto_connect_enabled: true,
        },
    );
    saved
}
