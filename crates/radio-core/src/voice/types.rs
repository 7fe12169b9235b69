//! Voice session and provider traits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use radio_common::{ChannelId, TenantId};
use serde::Serialize;

/// Connection state reported by a voice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Connecting,
    Ready,
    Closed,
}

/// Errors reported by the platform voice client.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("join failed: {0}")]
    Join(String),

    #[error("session closed")]
    Closed,

    #[error("transport error: {0}")]
    Transport(String),
}

/// A live (or half-open) voice connection for one guild.
#[async_trait]
pub trait VoiceSession: Send + Sync {
    fn status(&self) -> SessionStatus;

    /// Channel the session is currently attached to.
    fn channel_id(&self) -> Option<ChannelId>;

    async fn set_speaking(&self, speaking: bool) -> Result<(), VoiceError>;

    /// Queue one encoded frame on the outbound sink. May wait while the
    /// transport is congested.
    async fn send_frame(&self, frame: Vec<u8>) -> Result<(), VoiceError>;

    async fn disconnect(&self) -> Result<(), VoiceError>;
}

/// The platform client: joins channels and owns the per-guild session
/// registry.
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Join `channel` and register the resulting session for `tenant`.
    async fn join(
        &self,
        tenant: &TenantId,
        channel: &ChannelId,
        timeout: Duration,
    ) -> Result<Arc<dyn VoiceSession>, VoiceError>;

    /// Registered session for `tenant`, if any.
    fn session(&self, tenant: &TenantId) -> Option<Arc<dyn VoiceSession>>;

    /// Unregister and return the session for `tenant`.
    fn remove(&self, tenant: &TenantId) -> Option<Arc<dyn VoiceSession>>;

    /// Non-bot members currently in `channel`, read from live platform
    /// state.
    fn listener_count(&self, tenant: &TenantId, channel: &ChannelId) -> usize;
}
