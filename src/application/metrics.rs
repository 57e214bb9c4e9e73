//! Observability metrics for access decisions.
//!
//! Counts outcomes and fail-open events across every page session opened
//! from the same `Paywall`.

use crate::domain::outcome::AccessOutcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking gating statistics.
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    bots_granted: AtomicU64,
    granted: AtomicU64,
    denied: AtomicU64,
    /// Quota checks that failed and were treated as allowed
    quota_fail_open: AtomicU64,
    /// Accepted registration submissions
    registrations: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_outcome(&self, outcome: AccessOutcome) {
        let counter = match outcome {
            AccessOutcome::BotGranted => &self.inner.bots_granted,
            AccessOutcome::Granted => &self.inner.granted,
            AccessOutcome::Denied => &self.inner.denied,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fail_open(&self) {
        self.inner.quota_fail_open.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_registration(&self) {
        self.inner.registrations.fetch_add(1, Ordering::Relaxed);
    }

    /// Page loads served to automated agents.
    pub fn bots_granted(&self) -> u64 {
        self.inner.bots_granted.load(Ordering::Relaxed)
    }

    /// Metered page loads granted to humans.
    pub fn granted(&self) -> u64 {
        self.inner.granted.load(Ordering::Relaxed)
    }

    /// Page loads that ended on the paywall.
    pub fn denied(&self) -> u64 {
        self.inner.denied.load(Ordering::Relaxed)
    }

    /// Quota checks that failed open.
    pub fn quota_fail_open(&self) -> u64 {
        self.inner.quota_fail_open.load(Ordering::Relaxed)
    }

    /// Registration submissions that unlocked content.
    pub fn registrations(&self) -> u64 {
        self.inner.registrations.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bots_granted: self.bots_granted(),
            granted: self.granted(),
            denied: self.denied(),
            quota_fail_open: self.quota_fail_open(),
            registrations: self.registrations(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.bots_granted.store(0, Ordering::Relaxed);
        self.inner.granted.store(0, Ordering::Relaxed);
        self.inner.denied.store(0, Ordering::Relaxed);
        self.inner.quota_fail_open.store(0, Ordering::Relaxed);
        self.inner.registrations.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub bots_granted: u64,
    pub granted: u64,
    pub denied: u64,
    pub quota_fail_open: u64,
    pub registrations: u64,
}

impl MetricsSnapshot {
    /// Total decisions made (all outcomes).
    pub fn total_decisions(&self) -> u64 {
        self.bots_granted
            .saturating_add(self.granted)
            .saturating_add(self.denied)
    }

    /// Share of human page loads that were denied (0.0 to 1.0).
    ///
    /// Returns 0.0 if no human page load has been decided.
    pub fn denial_rate(&self) -> f64 {
        let humans = self.granted.saturating_add(self.denied);
        if humans == 0 {
            0.0
        } else {
            self.denied as f64 / humans as f64
        }
    }
}
