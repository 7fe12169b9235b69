//! Registry of running pipeline tasks, one per guild.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use radio_common::{RadioError, RadioEvent, TenantId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Radio, StreamHandle};
use crate::voice::shield::{caught, same_session};
use crate::voice::VoiceSession;

impl Radio {
    /// Start streaming into `session`.
    ///
    /// A stream already running on the same session is left alone; one on
    /// a different session is cancelled and replaced. Returns whether a new
    /// pipeline was spawned.
    pub(crate) fn start_stream(&self, tenant: &TenantId, session: Arc<dyn VoiceSession>) -> bool {
        if self.is_shutting_down() {
            return false;
        }

        let id = self.inner.next_stream_id.fetch_add(1, Ordering::Relaxed);
        let cancel = self.inner.cancel.child_token();
        {
            let mut streams = self.inner.streams.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(existing) = streams.get(tenant) {
                if same_session(&existing.session, &session) {
                    debug!(tenant = %tenant, "stream already running on this session");
                    return false;
                }
                debug!(tenant = %tenant, "replacing stream bound to a previous session");
                existing.cancel.cancel();
            }
            streams.insert(
                tenant.clone(),
                StreamHandle {
                    id,
                    session: Arc::clone(&session),
                    cancel: cancel.clone(),
                },
            );
        }

        let radio = self.clone();
        let tenant = tenant.clone();
        self.spawn(async move { radio.run_stream(tenant, session, id, cancel).await });
        true
    }

    /// Cancel the guild's stream. Returns whether one was running.
    pub(crate) fn stop_stream(&self, tenant: &TenantId) -> bool {
        let handle = self
            .inner
            .streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(tenant);
        match handle {
            Some(handle) => {
                handle.cancel.cancel();
                true
            }
            None => false,
        }
    }

    fn release_stream(&self, tenant: &TenantId, id: u64) {
        let mut streams = self.inner.streams.lock().unwrap_or_else(|e| e.into_inner());
        if streams.get(tenant).is_some_and(|h| h.id == id) {
            streams.remove(tenant);
        }
    }

    async fn run_stream(
        self,
        tenant: TenantId,
        session: Arc<dyn VoiceSession>,
        id: u64,
        cancel: CancellationToken,
    ) {
        let state = self.inner.store.get_or_create(&tenant);
        self.publish(RadioEvent::StreamStarted {
            tenant: tenant.clone(),
        });

        let release = StreamRelease {
            radio: self.clone(),
            tenant: tenant.clone(),
            id,
        };
        let active = Arc::clone(&state);
        let result = caught(
            "pipeline",
            self.inner
                .pipeline
                .run(&tenant, &session, move || active.is_active(), &cancel),
        )
        .await
        .and_then(|run| run);
        drop(release);

        let reason = match &result {
            Ok(_) => "deactivated".to_string(),
            Err(e) => e.to_string(),
        };
        self.publish(RadioEvent::StreamStopped {
            tenant: tenant.clone(),
            reason,
        });

        match result {
            Ok(frames) => info!(tenant = %tenant, frames, "stream finished"),
            Err(RadioError::Cancelled) => debug!(tenant = %tenant, "stream cancelled"),
            Err(e) => {
                if state.is_active() && !self.is_shutting_down() {
                    warn!(tenant = %tenant, error = %e, "stream failed, starting recovery");
                    self.schedule_recovery(&tenant);
                } else {
                    debug!(tenant = %tenant, error = %e, "stream failed after deactivation");
                }
            }
        }
    }
}

/// Frees the registry slot of a finished pipeline on every exit path.
struct StreamRelease {
    radio: Radio,
    tenant: TenantId,
    id: u64,
}

impl Drop for StreamRelease {
    fn drop(&mut self) {
        self.radio.release_stream(&self.tenant, self.id);
    }
}
