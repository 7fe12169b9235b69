use std::fmt;
use std::sync::Arc;

use radio_common::{ChannelId, ConfigError, TenantId};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::radio::Radio;

/// Single human-readable answer to a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReply {
    pub ok: bool,
    pub message: String,
}

impl CommandReply {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Radio {
    /// Connect to `channel` without starting the broadcast.
    pub async fn join(&self, tenant: &TenantId, channel: &ChannelId) -> CommandReply {
        let state = self.inner.store.get_or_create(tenant);
        state.set_target_channel(Some(channel.clone()));

        match self
            .inner
            .connections
            .connect(tenant, channel, &self.inner.cancel)
            .await
        {
            Ok(_) => CommandReply::ok(format!("Connected to {channel}.")),
            Err(e) => {
                error!(tenant = %tenant, channel = %channel, error = %e, "failed to connect to channel");
                CommandReply::err(format!("Failed to connect to the voice channel: {e}"))
            }
        }
    }

    /// Start broadcasting in `channel` with a fresh reconnect budget.
    pub async fn start_radio(&self, tenant: &TenantId, channel: &ChannelId) -> CommandReply {
        match self.activate(tenant, channel).await {
            Ok(()) => CommandReply::ok("Broadcasting radio!"),
            Err(e) => {
                error!(tenant = %tenant, channel = %channel, error = %e, "failed to start radio");
                CommandReply::err("Failed to connect to the voice channel for radio.")
            }
        }
    }

    pub async fn stop(&self, tenant: &TenantId) -> CommandReply {
        if self.deactivate(tenant, "stopped by command").await {
            CommandReply::ok("Disconnected.")
        } else {
            CommandReply::ok("I'm not in a voice channel.")
        }
    }

    /// Remember `channel` for auto-join and enable auto-connect.
    pub async fn set_auto_channel(&self, tenant: &TenantId, channel: &ChannelId) -> CommandReply {
        self.inner
            .store
            .get_or_create(tenant)
            .enable_auto_join(channel.clone());
        info!(tenant = %tenant, channel = %channel, "auto-join channel set");

        match self.persist_auto_join().await {
            Ok(()) => CommandReply::ok(format!("Auto-join set to {channel} (enabled).")),
            Err(e) => CommandReply::err(format!(
                "Auto-join set to {channel} (enabled), but saving failed: {e}"
            )),
        }
    }

    pub async fn set_auto_connect(&self, tenant: &TenantId, enabled: bool) -> CommandReply {
        let state = self.inner.store.get_or_create(tenant);
        state.set_auto_connect_enabled(enabled);
        info!(tenant = %tenant, enabled, "auto-connect toggled");

        let message = match (enabled, state.auto_channel()) {
            (true, Some(channel)) => format!("Auto-connect enabled for {channel}."),
            (true, None) => {
                "Auto-connect enabled. Set a channel with setchannel <id>.".to_string()
            }
            (false, _) => "Auto-connect disabled.".to_string(),
        };

        match self.persist_auto_join().await {
            Ok(()) => CommandReply::ok(message),
            Err(e) => CommandReply::err(format!("{message} Saving failed: {e}")),
        }
    }

    pub fn auto_connect_status(&self, tenant: &TenantId) -> CommandReply {
        let snapshot = self
            .inner
            .store
            .get(tenant)
            .map(|s| s.snapshot())
            .unwrap_or_default();
        let enabled = if snapshot.auto_connect_enabled {
            "enabled"
        } else {
            "disabled"
        };
        let channel = snapshot
            .auto_channel
            .map(|c| c.to_string())
            .unwrap_or_else(|| "not set".to_string());
        CommandReply::ok(format!("Auto-connect: {enabled}\nChannel: {channel}"))
    }

    /// Write every guild's auto-join settings through the configured store.
    pub(crate) async fn persist_auto_join(&self) -> Result<(), ConfigError> {
        let _order = self.inner.persist_lock.lock().await;
        let snapshot = self.inner.store.auto_join_snapshot();
        let store = Arc::clone(&self.inner.auto_join);
        let saved = tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .map_err(|e| ConfigError::PersistError(format!("save task failed: {e}")))?;
        if let Err(e) = &saved {
            warn!(error = %e, "failed to save auto-join settings");
        }
        saved
    }
}
