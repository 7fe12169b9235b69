//! One lazily created encoder per guild.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use radio_common::{RadioError, TenantId};
use radio_config::schema::EncoderProfile;
use tracing::debug;

use super::codec::{Codec, FrameEncoder};
use super::constants::{CHANNELS, SAMPLE_RATE};
use crate::voice::shield::shielded_sync;

pub type SharedEncoder = Arc<Mutex<Box<dyn FrameEncoder>>>;

/// Per-guild encoder cache.
///
/// Encoders carry inter-frame state, so a guild keeps the same one across
/// pipeline runs until it is explicitly removed.
pub struct EncoderCache {
    codec: Arc<dyn Codec>,
    profile: EncoderProfile,
    encoders: Mutex<HashMap<TenantId, SharedEncoder>>,
}

impl EncoderCache {
    pub fn new(codec: Arc<dyn Codec>, profile: EncoderProfile) -> Self {
        Self {
            codec,
            profile,
            encoders: Mutex::new(HashMap::new()),
        }
    }

    /// Existing encoder for `tenant`, or a new one. Concurrent callers get
    /// the same instance.
    pub fn get_or_create(&self, tenant: &TenantId) -> Result<SharedEncoder, RadioError> {
        let mut encoders = self.encoders.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(encoder) = encoders.get(tenant) {
            return Ok(Arc::clone(encoder));
        }

        let encoder = shielded_sync("new_encoder", || {
            self.codec.new_encoder(SAMPLE_RATE, CHANNELS, self.profile)
        })?
        .map_err(|e| RadioError::Encoder(e.to_string()))?;

        debug!(tenant = %tenant, profile = ?self.profile, "created encoder");
        let encoder = Arc::new(Mutex::new(encoder));
        encoders.insert(tenant.clone(), Arc::clone(&encoder));
        Ok(encoder)
    }

    pub fn remove(&self, tenant: &TenantId) -> bool {
        self.encoders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(tenant)
            .is_some()
    }

    pub fn contains(&self, tenant: &TenantId) -> bool {
        self.encoders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(tenant)
    }

    pub fn clear(&self) {
        self.encoders.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.encoders.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
