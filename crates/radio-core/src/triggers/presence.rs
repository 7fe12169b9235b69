use radio_common::{ChannelId, TenantId, UserId};
use tracing::{info, warn};

use crate::radio::Radio;

/// A member's voice channel changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub tenant: TenantId,
    pub user: UserId,
    pub is_bot: bool,
    pub before: Option<ChannelId>,
    pub after: Option<ChannelId>,
}

/// What a presence update caused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PresenceOutcome {
    pub deactivated: bool,
    pub auto_joined: bool,
}

impl Radio {
    /// React to a member joining, leaving or moving between channels.
    ///
    /// A move is handled as a leave of the old channel followed by a join
    /// of the new one. Bot members are ignored.
    pub async fn handle_presence(&self, update: PresenceUpdate) -> PresenceOutcome {
        let mut outcome = PresenceOutcome::default();
        if update.is_bot || update.before == update.after {
            return outcome;
        }

        if let Some(left) = &update.before {
            outcome.deactivated = self.abandon_if_empty(&update.tenant, left).await;
        }

        if let Some(joined) = &update.after {
            if let Some(channel) = self.auto_join_target(&update.tenant, Some(joined)) {
                info!(
                    tenant = %update.tenant,
                    user = %update.user,
                    channel = %channel,
                    "member joined auto-join channel, connecting"
                );
                outcome.auto_joined = true;
                if let Err(e) = self.activate(&update.tenant, &channel).await {
                    warn!(tenant = %update.tenant, error = %e, "auto-join failed");
                }
            }
        }
        outcome
    }

    /// Deactivate when the broadcast's channel has no listeners left.
    pub(crate) async fn abandon_if_empty(&self, tenant: &TenantId, channel: &ChannelId) -> bool {
        if !self.inner.config.reconnect.abandon_when_empty {
            return false;
        }
        let Some(state) = self.inner.store.get(tenant) else {
            return false;
        };
        if !state.is_active() || state.target_channel().as_ref() != Some(channel) {
            return false;
        }
        if self.inner.connections.listener_count(tenant, channel) > 0 {
            return false;
        }
        info!(tenant = %tenant, channel = %channel, "no listeners left, leaving channel");
        self.deactivate(tenant, "channel empty").await;
        true
    }

    /// The auto-join channel if the guild should auto-join it now.
    ///
    /// Requires auto-connect enabled, a saved channel with listeners, and
    /// an idle guild; a broadcast already running anywhere takes
    /// precedence. With `joined` set, only that channel qualifies.
    pub(crate) fn auto_join_target(
        &self,
        tenant: &TenantId,
        joined: Option<&ChannelId>,
    ) -> Option<ChannelId> {
        let state = self.inner.store.get(tenant)?;
        if !state.is_auto_connect_enabled() || state.is_active() {
            return None;
        }
        let channel = state.auto_channel()?;
        if joined.is_some_and(|joined| joined != &channel) {
            return None;
        }
        if self.inner.connections.listener_count(tenant, &channel) == 0 {
            return None;
        }
        Some(channel)
    }
}
