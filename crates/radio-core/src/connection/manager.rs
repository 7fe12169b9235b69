use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use radio_common::{ChannelId, RadioError, TenantId};
use radio_config::schema::ConnectionConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::voice::shield::{probe_status, same_session, shielded, shielded_sync};
use crate::voice::{SessionStatus, VoiceProvider, VoiceSession};

/// Sleep for `delay` unless `cancel` fires first.
pub(crate) async fn sleep_or_cancel(
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<(), RadioError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RadioError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

/// Produces a ready session in the requested channel, or fails cleanly.
///
/// Connects for the same guild are serialized, so concurrent triggers
/// cannot leave two sessions registered; the second caller takes the fast
/// path once the first has finished. Teardown never waits on that lock.
pub struct ConnectionManager {
    provider: Arc<dyn VoiceProvider>,
    config: ConnectionConfig,
    locks: Mutex<HashMap<TenantId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ConnectionManager {
    pub fn new(provider: Arc<dyn VoiceProvider>, config: ConnectionConfig) -> Self {
        Self {
            provider,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn tenant_lock(&self, tenant: &TenantId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(tenant.clone()).or_default())
    }

    // -----------------------------------------------------------------------
    // Registry access
    // -----------------------------------------------------------------------

    /// Currently registered session for `tenant`.
    pub fn current(&self, tenant: &TenantId) -> Option<Arc<dyn VoiceSession>> {
        shielded_sync("session", || self.provider.session(tenant))
            .ok()
            .flatten()
    }

    /// Registered session if it is ready and, when given, attached to
    /// `channel`.
    pub fn live_session(
        &self,
        tenant: &TenantId,
        channel: Option<&ChannelId>,
    ) -> Option<Arc<dyn VoiceSession>> {
        let session = self.current(tenant)?;
        if probe_status(&session) != SessionStatus::Ready {
            return None;
        }
        if let Some(channel) = channel {
            let attached = shielded_sync("channel_id", || session.channel_id())
                .ok()
                .flatten();
            if attached.as_ref() != Some(channel) {
                return None;
            }
        }
        Some(session)
    }

    /// Non-bot members in `channel`. A faulting provider reports zero.
    pub fn listener_count(&self, tenant: &TenantId, channel: &ChannelId) -> usize {
        match shielded_sync("listener_count", || {
            self.provider.listener_count(tenant, channel)
        }) {
            Ok(count) => count,
            Err(e) => {
                warn!(tenant = %tenant, channel = %channel, error = %e, "could not read channel occupancy");
                0
            }
        }
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Unregister and disconnect whatever session `tenant` has. Faults from
    /// the session are logged and swallowed. Returns whether a session was
    /// registered.
    pub async fn disconnect(&self, tenant: &TenantId) -> bool {
        let removed = shielded_sync("remove", || self.provider.remove(tenant))
            .ok()
            .flatten();
        match removed {
            Some(session) => {
                close_session(tenant, &session).await;
                true
            }
            None => false,
        }
    }

    /// Tear down `session`, unregistering it only if it is still the
    /// registered one.
    async fn discard(&self, tenant: &TenantId, session: &Arc<dyn VoiceSession>) {
        if let Some(current) = self.current(tenant) {
            if same_session(&current, session) {
                let _ = shielded_sync("remove", || self.provider.remove(tenant));
            }
        }
        close_session(tenant, session).await;
    }

    // -----------------------------------------------------------------------
    // Connect
    // -----------------------------------------------------------------------

    /// Connect `tenant` to `channel`.
    ///
    /// Reuses the registered session when it is already ready in `channel`.
    /// Otherwise any stale session is torn down and a join is retried with
    /// linear backoff, then the new session must reach and hold the ready
    /// state. On failure nothing is left registered.
    pub async fn connect(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn VoiceSession>, RadioError> {
        let lock = self.tenant_lock(tenant);
        let _guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RadioError::Cancelled),
            guard = lock.lock() => guard,
        };

        if let Some(session) = self.live_session(tenant, Some(channel)) {
            debug!(tenant = %tenant, channel = %channel, "already connected to target channel");
            return Ok(session);
        }
        if self.disconnect(tenant).await {
            debug!(tenant = %tenant, "tore down stale voice session");
        }

        let session = self.join_with_retries(tenant, channel, cancel).await?;

        match self.wait_ready(tenant, &session, cancel).await {
            Ok(()) => {
                info!(tenant = %tenant, channel = %channel, "connected to voice channel");
                Ok(session)
            }
            Err(e) => {
                warn!(tenant = %tenant, channel = %channel, error = %e, "voice session never became ready");
                self.discard(tenant, &session).await;
                Err(e)
            }
        }
    }

    async fn join_with_retries(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn VoiceSession>, RadioError> {
        let attempts = self.config.join_attempts.max(1);
        let timeout = self.config.join_timeout();
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=attempts {
            if attempt > 1 {
                sleep_or_cancel(self.config.retry_delay() * (attempt - 1), cancel).await?;
                self.disconnect(tenant).await;
                sleep_or_cancel(self.config.retry_teardown_wait(), cancel).await?;
            }

            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(RadioError::Cancelled),
                joined = tokio::time::timeout(
                    timeout,
                    shielded("join", self.provider.join(tenant, channel, timeout)),
                ) => joined.unwrap_or(Err(RadioError::ConnectionTimeout(timeout))),
            };

            match joined {
                Ok(session) => return Ok(session),
                Err(RadioError::Cancelled) => {
                    self.disconnect(tenant).await;
                    return Err(RadioError::Cancelled);
                }
                Err(e) => {
                    warn!(
                        tenant = %tenant,
                        channel = %channel,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "voice join attempt failed"
                    );
                    last_error = e.to_string();
                }
            }
        }

        self.disconnect(tenant).await;
        Err(RadioError::ConnectionFailed {
            attempts,
            reason: last_error,
        })
    }

    /// Poll until the session is ready, then require it to stay ready for
    /// the stabilization window. A session that flaps keeps polling until
    /// the overall deadline.
    async fn wait_ready(
        &self,
        tenant: &TenantId,
        session: &Arc<dyn VoiceSession>,
        cancel: &CancellationToken,
    ) -> Result<(), RadioError> {
        let ready_timeout = self.config.ready_timeout();
        let deadline = tokio::time::Instant::now() + ready_timeout;
        let mut poll = tokio::time::interval(self.config.ready_poll());
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RadioError::Cancelled),
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(RadioError::ConnectionTimeout(ready_timeout));
                }
                _ = poll.tick() => {}
            }

            if probe_status(session) != SessionStatus::Ready {
                continue;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RadioError::Cancelled),
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(RadioError::ConnectionTimeout(ready_timeout));
                }
                _ = tokio::time::sleep(self.config.stabilize()) => {}
            }

            if probe_status(session) == SessionStatus::Ready {
                return Ok(());
            }
            debug!(tenant = %tenant, "voice session flapped during stabilization");
        }
    }
}

/// Disconnect `session`, logging instead of propagating faults.
async fn close_session(tenant: &TenantId, session: &Arc<dyn VoiceSession>) {
    if let Err(e) = shielded("disconnect", session.disconnect()).await {
        debug!(tenant = %tenant, error = %e, "ignored error while disconnecting");
    }
}
