//! The reconnect loop run after a broadcast is lost.

use radio_common::{RadioError, RadioEvent, TenantId};
use tracing::{debug, error, info, warn};

use super::backoff::backoff_delay;
use crate::connection::sleep_or_cancel;
use crate::radio::Radio;

/// How a recovery cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// Reconnected and streaming again.
    Recovered,
    /// The guild was deactivated before or during recovery.
    Inactive,
    /// The attempt budget ran out; the guild was deactivated.
    Exhausted,
    /// No target channel was recorded.
    NoChannel,
    /// The target channel had no listeners; the guild was deactivated.
    Abandoned,
    /// Shutdown interrupted recovery.
    Cancelled,
}

impl Radio {
    /// Start a recovery cycle for `tenant` unless one is already running.
    /// Returns whether a new cycle was started.
    pub(crate) fn schedule_recovery(&self, tenant: &TenantId) -> bool {
        if self.is_shutting_down() {
            return false;
        }
        {
            let mut recovering = self
                .inner
                .recovering
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if !recovering.insert(tenant.clone()) {
                debug!(tenant = %tenant, "recovery already in progress");
                return false;
            }
        }

        let radio = self.clone();
        let tenant = tenant.clone();
        self.spawn(async move {
            let outcome = radio.recover(&tenant).await;
            radio
                .inner
                .recovering
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&tenant);
            debug!(tenant = %tenant, ?outcome, "recovery finished");
        });
        true
    }

    /// Reconnect until the broadcast is back, the guild is deactivated, or
    /// the attempt budget is spent.
    pub(crate) async fn recover(&self, tenant: &TenantId) -> RecoveryOutcome {
        let reconnect = &self.inner.config.reconnect;
        let cancel = &self.inner.cancel;

        loop {
            let Some(state) = self.inner.store.get(tenant) else {
                return RecoveryOutcome::Inactive;
            };
            if !state.is_active() {
                info!(tenant = %tenant, "radio not active anymore, skipping reconnect");
                return RecoveryOutcome::Inactive;
            }

            let attempts = state.reconnect_attempts();
            if attempts >= reconnect.max_attempts {
                let reason = RadioError::RecoveryExhausted { attempts };
                error!(tenant = %tenant, error = %reason, "giving up on reconnecting");
                self.deactivate(tenant, &reason.to_string()).await;
                self.publish(RadioEvent::RecoveryExhausted {
                    tenant: tenant.clone(),
                    attempts,
                });
                return RecoveryOutcome::Exhausted;
            }
            let Some(channel) = state.target_channel() else {
                warn!(tenant = %tenant, error = %RadioError::NoChannel, "cannot reconnect");
                return RecoveryOutcome::NoChannel;
            };

            if reconnect.abandon_when_empty
                && self.inner.connections.listener_count(tenant, &channel) == 0
            {
                info!(tenant = %tenant, channel = %channel, "channel is empty, not reconnecting");
                self.deactivate(tenant, "channel empty").await;
                return RecoveryOutcome::Abandoned;
            }

            let delay = backoff_delay(reconnect.backoff_base(), attempts);
            info!(
                tenant = %tenant,
                attempt = attempts + 1,
                max_attempts = reconnect.max_attempts,
                delay = ?delay,
                "scheduling reconnect"
            );
            self.publish(RadioEvent::ReconnectScheduled {
                tenant: tenant.clone(),
                attempt: attempts + 1,
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            });

            if sleep_or_cancel(delay, cancel).await.is_err() {
                return RecoveryOutcome::Cancelled;
            }
            if !state.is_active() {
                info!(tenant = %tenant, "radio deactivated during backoff");
                return RecoveryOutcome::Inactive;
            }

            state.increment_reconnect_attempts();
            match self.inner.connections.connect(tenant, &channel, cancel).await {
                Ok(session) => {
                    if !state.is_active() {
                        self.inner.connections.disconnect(tenant).await;
                        return RecoveryOutcome::Inactive;
                    }
                    info!(tenant = %tenant, channel = %channel, "reconnected, restarting stream");
                    state.reset_reconnect_attempts();
                    self.publish(RadioEvent::Connected {
                        tenant: tenant.clone(),
                        channel: channel.clone(),
                    });
                    self.start_stream(tenant, session);
                    return RecoveryOutcome::Recovered;
                }
                Err(RadioError::Cancelled) => return RecoveryOutcome::Cancelled,
                Err(e) => {
                    error!(tenant = %tenant, error = %e, "failed to reconnect");
                }
            }
        }
    }
}
