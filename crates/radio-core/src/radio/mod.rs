//! The radio service handle.
//!
//! [`Radio`] is cheap to clone; every clone shares the same state store,
//! stream registry and background task set. Hosts feed it commands and
//! presence updates and call [`Radio::start`] once the platform client is
//! ready.

mod activation;
mod shutdown;
mod streams;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::{Arc, Mutex};

use radio_common::{ChannelId, EventBus, RadioEvent, TenantId};
use radio_config::{AutoJoinStore, RadioConfig};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::audio::{Codec, DecodeSource, EncoderCache, Pipeline};
use crate::connection::ConnectionManager;
use crate::state::{StateStore, TenantSnapshot};
use crate::voice::shield::{probe_status, shielded_sync};
use crate::voice::{SessionStatus, VoiceProvider, VoiceSession};

const EVENT_CAPACITY: usize = 256;

/// Host-supplied implementations of the external contracts.
pub struct Collaborators {
    pub voice: Arc<dyn VoiceProvider>,
    pub codec: Arc<dyn Codec>,
    pub source: Arc<dyn DecodeSource>,
    pub auto_join: Arc<dyn AutoJoinStore>,
}

/// Status of one guild as reported by the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct RadioStatus {
    pub tenant: TenantId,
    #[serde(flatten)]
    pub state: TenantSnapshot,
    pub session: Option<SessionStatus>,
    pub session_channel: Option<ChannelId>,
    pub streaming: bool,
    pub recovering: bool,
}

pub(crate) struct StreamHandle {
    id: u64,
    session: Arc<dyn VoiceSession>,
    cancel: CancellationToken,
}

pub(crate) struct RadioInner {
    pub(crate) config: RadioConfig,
    pub(crate) store: StateStore,
    pub(crate) connections: ConnectionManager,
    pub(crate) encoders: Arc<EncoderCache>,
    pub(crate) pipeline: Pipeline,
    pub(crate) auto_join: Arc<dyn AutoJoinStore>,
    /// Held from snapshot to completed save so saves land in order.
    pub(crate) persist_lock: tokio::sync::Mutex<()>,
    pub(crate) events: EventBus,
    pub(crate) streams: Mutex<HashMap<TenantId, StreamHandle>>,
    pub(crate) recovering: Mutex<HashSet<TenantId>>,
    pub(crate) next_stream_id: AtomicU64,
    pub(crate) tasks: TaskTracker,
    pub(crate) cancel: CancellationToken,
    pub(crate) health_started: AtomicBool,
}

#[derive(Clone)]
pub struct Radio {
    pub(crate) inner: Arc<RadioInner>,
}

impl Radio {
    /// Build the service and seed it with the saved auto-join settings. An
    /// unreadable settings file is logged and treated as empty.
    pub fn new(config: RadioConfig, parts: Collaborators) -> Self {
        let store = StateStore::new();
        match parts.auto_join.load() {
            Ok(saved) => {
                store.apply_auto_join(&saved);
                info!(guilds = saved.len(), "auto-join settings restored");
            }
            Err(e) => warn!(error = %e, "failed to load auto-join settings, starting empty"),
        }

        let encoders = Arc::new(EncoderCache::new(
            parts.codec,
            config.pipeline.encoder_profile,
        ));
        let pipeline = Pipeline::new(
            parts.source,
            Arc::clone(&encoders),
            &config.stream,
            &config.pipeline,
        );
        let connections = ConnectionManager::new(parts.voice, config.connection.clone());

        Self {
            inner: Arc::new(RadioInner {
                config,
                store,
                connections,
                encoders,
                pipeline,
                auto_join: parts.auto_join,
                persist_lock: tokio::sync::Mutex::new(()),
                events: EventBus::new(EVENT_CAPACITY),
                streams: Mutex::new(HashMap::new()),
                recovering: Mutex::new(HashSet::new()),
                next_stream_id: AtomicU64::new(1),
                tasks: TaskTracker::new(),
                cancel: CancellationToken::new(),
                health_started: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &RadioConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &StateStore {
        &self.inner.store
    }

    pub fn encoders(&self) -> &EncoderCache {
        &self.inner.encoders
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RadioEvent> {
        self.inner.events.subscribe()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    pub(crate) fn publish(&self, event: RadioEvent) {
        let _ = self.inner.events.publish(event);
    }

    /// Run `fut` as a tracked background task awaited by shutdown.
    pub(crate) fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.tasks.spawn(fut);
    }

    pub fn is_streaming(&self, tenant: &TenantId) -> bool {
        self.inner
            .streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(tenant)
    }

    pub fn is_recovering(&self, tenant: &TenantId) -> bool {
        self.inner
            .recovering
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(tenant)
    }

    pub fn status(&self, tenant: &TenantId) -> RadioStatus {
        let state = self
            .inner
            .store
            .get(tenant)
            .map(|s| s.snapshot())
            .unwrap_or_default();
        let session = self.inner.connections.current(tenant);
        RadioStatus {
            tenant: tenant.clone(),
            state,
            session: session.as_ref().map(probe_status),
            session_channel: session.and_then(|s| {
                shielded_sync("channel_id", || s.channel_id()).ok().flatten()
            }),
            streaming: self.is_streaming(tenant),
            recovering: self.is_recovering(tenant),
        }
    }
}
