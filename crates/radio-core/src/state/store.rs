//! Registry of per-guild state records.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use radio_common::TenantId;
use radio_config::{AutoJoinConfig, AutoJoinEntry};

use super::tenant::TenantRadioState;

/// Thread-safe map from guild to its state record.
///
/// Lookups hand out `Arc`s, so a record stays valid for a caller even while
/// other guilds are being added. The map lock is separate from every
/// record's lock.
#[derive(Clone, Default)]
pub struct StateStore {
    states: Arc<RwLock<HashMap<TenantId, Arc<TenantRadioState>>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for `tenant`, created on first use. Concurrent callers
    /// always receive the same record.
    pub fn get_or_create(&self, tenant: &TenantId) -> Arc<TenantRadioState> {
        if let Some(state) = self.get(tenant) {
            return state;
        }
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(states.entry(tenant.clone()).or_default())
    }

    pub fn get(&self, tenant: &TenantId) -> Option<Arc<TenantRadioState>> {
        self.states
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(tenant)
            .cloned()
    }

    /// Snapshot of known guild ids, sorted.
    pub fn tenant_ids(&self) -> Vec<TenantId> {
        let mut ids: Vec<TenantId> = self
            .states
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn remove(&self, tenant: &TenantId) -> Option<Arc<TenantRadioState>> {
        self.states
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(tenant)
    }

    pub fn len(&self) -> usize {
        self.states.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed auto-join settings loaded at startup.
    pub fn apply_auto_join(&self, config: &AutoJoinConfig) {
        for (tenant, entry) in config {
            let state = self.get_or_create(tenant);
            state.set_auto_channel(entry.auto_channel_id.clone());
            state.set_auto_connect_enabled(entry.auto_connect_enabled);
        }
    }

    /// Auto-join settings of every known guild, ready to persist.
    pub fn auto_join_snapshot(&self) -> AutoJoinConfig {
        let states = self.states.read().unwrap_or_else(|e| e.into_inner());
        states
            .iter()
            .map(|(tenant, state)| {
                (
                    tenant.clone(),
                    AutoJoinEntry {
                        auto_channel_id: state.auto_channel(),
                        auto_connect_enabled: state.is_auto_connect_enabled(),
                    },
                )
            })
            .collect()
    }
}
