use radio_common::RadioEvent;
use tracing::{info, warn};

use super::Radio;

impl Radio {
    /// Stop every broadcast and wait for background tasks.
    ///
    /// Cancels all pending work, disconnects every guild and drops every
    /// encoder, then waits up to `shutdown.timeout_secs` for tracked tasks.
    /// Returns `false` when the wait timed out.
    pub async fn shutdown(&self) -> bool {
        info!("shutting down radio");
        self.inner.cancel.cancel();
        self.publish(RadioEvent::Shutdown);

        for tenant in self.inner.store.tenant_ids() {
            if let Some(state) = self.inner.store.get(&tenant) {
                state.reset();
            }
            self.stop_stream(&tenant);
            self.inner.connections.disconnect(&tenant).await;
        }
        self.inner.encoders.clear();

        self.inner.tasks.close();
        let timeout = self.inner.config.shutdown.timeout();
        match tokio::time::timeout(timeout, self.inner.tasks.wait()).await {
            Ok(()) => {
                info!("all radio tasks finished");
                true
            }
            Err(_) => {
                warn!(timeout = ?timeout, remaining = self.inner.tasks.len(), "timed out waiting for radio tasks");
                false
            }
        }
    }
}
