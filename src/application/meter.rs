//! Per-site visit counter.
//!
//! `MeterStore` wraps a `MeterBackend` and never fails: unreadable or
//! corrupted counters read as zero, and failed writes are logged and
//! dropped. The count held in memory for the current page load stays
//! authoritative either way.

use crate::application::ports::MeterBackend;
use crate::domain::meter::{format_count, meter_key, parse_count};
use std::sync::Arc;

/// Best-effort persisted visit counter, keyed by site id.
#[derive(Debug, Clone)]
pub struct MeterStore {
    backend: Arc<dyn MeterBackend>,
}

impl MeterStore {
    /// Create a meter store over a storage medium.
    pub fn new(backend: Arc<dyn MeterBackend>) -> Self {
        Self { backend }
    }

    /// Load the visit count for a site.
    ///
    /// Returns `0` if the counter is absent, unparsable, or the backend fails.
    pub fn load(&self, site_id: &str) -> u32 {
        let key = meter_key(site_id);

        match self.backend.read(&key) {
            Ok(Some(raw)) => parse_count(&raw).unwrap_or_else(|| {
                tracing::debug!(key = %key, raw = %raw, "corrupted meter value, treating as 0");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "meter unreadable, treating as 0");
                0
            }
        }
    }

    /// Persist the visit count for a site. Failures are tolerated.
    pub fn save(&self, site_id: &str, count: u32) {
        let key = meter_key(site_id);

        if let Err(e) = self.backend.write(&key, &format_count(count)) {
            tracing::warn!(key = %key, count, error = %e, "failed to persist meter");
        }
    }

    /// Reset a site's visit count to zero.
    pub fn reset(&self, site_id: &str) {
        self.save(site_id, 0);
    }

    /// Get a reference to the storage medium.
    pub fn backend(&self) -> &Arc<dyn MeterBackend> {
        &self.backend
    }
}
