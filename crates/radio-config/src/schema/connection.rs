//! Voice connection, recovery and health-check configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a voice session is established and validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Join attempts per `connect` call.
    pub join_attempts: u32,
    /// Timeout handed to the provider for a single join.
    pub join_timeout_secs: u64,
    /// Delay unit between join attempts; attempt `n` waits `n * retry_delay`.
    pub retry_delay_ms: u64,
    /// Pause after tearing down a half-open session before retrying.
    pub retry_teardown_wait_ms: u64,
    /// Deadline for a joined session to report ready.
    pub ready_timeout_ms: u64,
    /// Status polling interval while waiting for ready.
    pub ready_poll_ms: u64,
    /// Grace period after ready before the status is re-checked.
    pub stabilize_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            join_attempts: 3,
            join_timeout_secs: 15,
            retry_delay_ms: 1000,
            retry_teardown_wait_ms: 500,
            ready_timeout_ms: 10_000,
            ready_poll_ms: 100,
            stabilize_ms: 500,
        }
    }
}

impl ConnectionConfig {
    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn retry_teardown_wait(&self) -> Duration {
        Duration::from_millis(self.retry_teardown_wait_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn ready_poll(&self) -> Duration {
        Duration::from_millis(self.ready_poll_ms)
    }

    pub fn stabilize(&self) -> Duration {
        Duration::from_millis(self.stabilize_ms)
    }
}

/// Reconnect supervisor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Consecutive failed recoveries before giving up.
    pub max_attempts: u32,
    /// Backoff for attempt `n` is `backoff_base * 2^n`.
    pub backoff_base_ms: u64,
    /// Deactivate instead of reconnecting when nobody is listening.
    pub abandon_when_empty: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base_ms: 2000,
            abandon_when_empty: true,
        }
    }
}

impl ReconnectConfig {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

/// Periodic health and auto-join scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub check_interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 20,
        }
    }
}

impl HealthConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}
