use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::{ChannelId, TenantId};

/// Lifecycle notifications published by the radio core.
///
/// Commands are fire-and-forget; hosts that want to report progress back to
/// users subscribe to these instead of waiting on the command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RadioEvent {
    Connected {
        tenant: TenantId,
        channel: ChannelId,
    },
    StreamStarted {
        tenant: TenantId,
    },
    StreamStopped {
        tenant: TenantId,
        reason: String,
    },
    ReconnectScheduled {
        tenant: TenantId,
        attempt: u32,
        delay_ms: u64,
    },
    RecoveryExhausted {
        tenant: TenantId,
        attempts: u32,
    },
    Deactivated {
        tenant: TenantId,
        reason: String,
    },
    Shutdown,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<RadioEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RadioEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: RadioEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}
