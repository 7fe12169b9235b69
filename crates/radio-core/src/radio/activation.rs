//! Shared activate/deactivate paths used by commands, presence updates,
//! health checks and recovery.

use radio_common::{ChannelId, RadioError, RadioEvent, TenantId};
use tracing::{debug, info};

use super::Radio;

impl Radio {
    /// Mark the guild active in `channel`, connect, and start streaming.
    ///
    /// The guild stays active when the connect fails, so the health check
    /// keeps trying to restore it.
    pub(crate) async fn activate(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
    ) -> Result<(), RadioError> {
        let state = self.inner.store.get_or_create(tenant);
        state.activate(channel.clone());

        let session = self
            .inner
            .connections
            .connect(tenant, channel, &self.inner.cancel)
            .await?;

        if !state.is_active() {
            debug!(tenant = %tenant, "deactivated while connecting, dropping session");
            self.inner.connections.disconnect(tenant).await;
            return Ok(());
        }
        if state.target_channel().as_ref() != Some(channel) {
            debug!(tenant = %tenant, "target channel changed while connecting");
            return Ok(());
        }

        self.publish(RadioEvent::Connected {
            tenant: tenant.clone(),
            channel: channel.clone(),
        });
        self.start_stream(tenant, session);
        Ok(())
    }

    /// Stop the broadcast: reset the guild's session data, stop the stream,
    /// disconnect and drop the encoder. Returns whether a voice
    /// session was registered.
    pub(crate) async fn deactivate(&self, tenant: &TenantId, reason: &str) -> bool {
        if let Some(state) = self.inner.store.get(tenant) {
            state.reset();
        }
        self.stop_stream(tenant);
        let had_session = self.inner.connections.disconnect(tenant).await;
        self.inner.encoders.remove(tenant);

        info!(tenant = %tenant, reason, "radio deactivated");
        self.publish(RadioEvent::Deactivated {
            tenant: tenant.clone(),
            reason: reason.to_string(),
        });
        had_session
    }
}
