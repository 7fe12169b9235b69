use std::sync::atomic::Ordering;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::radio::Radio;

/// Actions taken by one health check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    pub checked: usize,
    pub recoveries: usize,
    pub streams_restarted: usize,
    pub deactivated: usize,
    pub auto_joins: usize,
}

impl Radio {
    /// Start the periodic health check. Later calls are no-ops.
    pub fn start(&self) {
        if self.inner.health_started.swap(true, Ordering::SeqCst) {
            debug!("health check already running");
            return;
        }
        let radio = self.clone();
        self.spawn(async move { radio.health_loop().await });
        info!(
            interval = ?self.inner.config.health.check_interval(),
            url = %self.inner.pipeline.url(),
            "radio started"
        );
    }

    async fn health_loop(self) {
        let period = self.inner.config.health.check_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.inner.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let report = self.run_health_check().await;
                    debug!(?report, "health check complete");
                }
            }
        }
        debug!("health check stopped");
    }

    /// Check every known guild once.
    ///
    /// Active guilds with a lost or misplaced session get a recovery cycle;
    /// a ready session without a stream gets a new pipeline; an empty
    /// channel is abandoned. Idle guilds are auto-joined when their saved
    /// channel has listeners, covering presence updates that were missed.
    pub async fn run_health_check(&self) -> HealthReport {
        let mut report = HealthReport::default();
        if self.is_shutting_down() {
            return report;
        }

        for tenant in self.inner.store.tenant_ids() {
            let Some(state) = self.inner.store.get(&tenant) else {
                continue;
            };
            report.checked += 1;

            if !state.is_active() {
                if let Some(channel) = self.auto_join_target(&tenant, None) {
                    info!(tenant = %tenant, channel = %channel, "listeners in auto-join channel, connecting");
                    report.auto_joins += 1;
                    let radio = self.clone();
                    self.spawn(async move {
                        if let Err(e) = radio.activate(&tenant, &channel).await {
                            warn!(tenant = %tenant, error = %e, "auto-join failed");
                        }
                    });
                }
                continue;
            }

            if self.is_recovering(&tenant) {
                continue;
            }

            let target = state.target_channel();
            if let Some(channel) = &target {
                if self.abandon_if_empty(&tenant, channel).await {
                    report.deactivated += 1;
                    continue;
                }
            }

            match self.inner.connections.live_session(&tenant, target.as_ref()) {
                None => {
                    warn!(tenant = %tenant, "voice connection lost, reconnecting");
                    if self.schedule_recovery(&tenant) {
                        report.recoveries += 1;
                    }
                }
                Some(session) => {
                    if !self.is_streaming(&tenant) && self.start_stream(&tenant, session) {
                        info!(tenant = %tenant, "connected but silent, restarting stream");
                        report.streams_restarted += 1;
                    }
                }
            }
        }
        report
    }
}
