use std::sync::{Mutex, MutexGuard};

use radio_common::ChannelId;
use serde::Serialize;

#[derive(Debug, Default, Clone)]
struct Fields {
    active: bool,
    target_channel: Option<ChannelId>,
    auto_channel: Option<ChannelId>,
    auto_connect_enabled: bool,
    reconnect_attempts: u32,
}

/// Point-in-time copy of one guild's state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TenantSnapshot {
    pub active: bool,
    pub target_channel: Option<ChannelId>,
    pub auto_channel: Option<ChannelId>,
    pub auto_connect_enabled: bool,
    pub reconnect_attempts: u32,
}

/// Mutable radio state of one guild.
///
/// Every accessor takes the record's own lock, so reads and writes from
/// concurrent triggers never observe a torn update. The lock is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct TenantRadioState {
    fields: Mutex<Fields>,
}

impl TenantRadioState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Fields> {
        self.fields.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn set_active(&self, active: bool) {
        self.lock().active = active;
    }

    pub fn target_channel(&self) -> Option<ChannelId> {
        self.lock().target_channel.clone()
    }

    pub fn set_target_channel(&self, channel: Option<ChannelId>) {
        self.lock().target_channel = channel;
    }

    pub fn auto_channel(&self) -> Option<ChannelId> {
        self.lock().auto_channel.clone()
    }

    pub fn set_auto_channel(&self, channel: Option<ChannelId>) {
        self.lock().auto_channel = channel;
    }

    pub fn is_auto_connect_enabled(&self) -> bool {
        self.lock().auto_connect_enabled
    }

    pub fn set_auto_connect_enabled(&self, enabled: bool) {
        self.lock().auto_connect_enabled = enabled;
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.lock().reconnect_attempts
    }

    /// Returns the new count.
    pub fn increment_reconnect_attempts(&self) -> u32 {
        let mut fields = self.lock();
        fields.reconnect_attempts = fields.reconnect_attempts.saturating_add(1);
        fields.reconnect_attempts
    }

    pub fn reset_reconnect_attempts(&self) {
        self.lock().reconnect_attempts = 0;
    }

    /// Mark the broadcast wanted in `channel` with a fresh recovery budget.
    pub fn activate(&self, channel: ChannelId) {
        let mut fields = self.lock();
        fields.active = true;
        fields.target_channel = Some(channel);
        fields.reconnect_attempts = 0;
    }

    /// Stop wanting a broadcast and forget its session data. Auto-join
    /// settings are kept.
    pub fn reset(&self) {
        let mut fields = self.lock();
        fields.active = false;
        fields.target_channel = None;
        fields.reconnect_attempts = 0;
    }

    /// Set the auto-join channel and enable auto-connect together.
    pub fn enable_auto_join(&self, channel: ChannelId) {
        let mut fields = self.lock();
        fields.auto_channel = Some(channel);
        fields.auto_connect_enabled = true;
    }

    pub fn snapshot(&self) -> TenantSnapshot {
        let fields = self.lock();
        TenantSnapshot {
            active: fields.active,
            target_channel: fields.target_channel.clone(),
            auto_channel: fields.auto_channel.clone(),
            auto_connect_enabled: fields.auto_connect_enabled,
            reconnect_attempts: fields.reconnect_attempts,
        }
    }
}
