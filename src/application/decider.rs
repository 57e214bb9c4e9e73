//! Access decision for a page load.
//!
//! Combines the classifier, the local meter and the backend quota check into
//! one of three outcomes. The decision never fails: any problem reaching the
//! backend lets the visitor through.

use crate::application::meter::MeterStore;
use crate::application::metrics::Metrics;
use crate::application::ports::{Gateway, GatewayError};
use crate::application::tasks::spawn_detached;
use crate::domain::classifier::classify;
use crate::domain::config::Configuration;
use crate::domain::outcome::{AccessOutcome, QuotaVerdict};
use std::sync::Arc;

/// Decides whether a page load is granted.
///
/// Cheap to clone; clones share the meter, gateway and metrics.
#[derive(Debug, Clone)]
pub struct AccessDecider {
    config: Arc<Configuration>,
    meter: MeterStore,
    gateway: Arc<dyn Gateway>,
    metrics: Metrics,
}

impl AccessDecider {
    /// Create a decider.
    pub fn new(
        config: Arc<Configuration>,
        meter: MeterStore,
        gateway: Arc<dyn Gateway>,
        metrics: Metrics,
    ) -> Self {
        Self {
            config,
            meter,
            gateway,
            metrics,
        }
    }

    /// Decide access for one page load.
    ///
    /// Automated agents are granted without touching the meter or the
    /// network. Humans under the free-view limit are checked against the
    /// backend; a granted view increments the stored count and is reported
    /// to the backend in the background.
    ///
    /// # Panics
    /// The quota check is bounded with `tokio::time::timeout`, so this must
    /// be awaited on a tokio runtime with the time driver enabled
    /// (`enable_time()` or `enable_all()`).
    pub async fn decide(&self, path: &str, user_agent: &str) -> AccessOutcome {
        let outcome = self.evaluate(path, user_agent).await;
        self.metrics.record_outcome(outcome);
        tracing::info!(
            site = %self.config.site_id(),
            path = %path,
            outcome = %outcome,
            "access decided"
        );
        outcome
    }

    async fn evaluate(&self, path: &str, user_agent: &str) -> AccessOutcome {
        let classification = classify(user_agent);
        if let Some(signature) = classification.matched_signature() {
            tracing::debug!(signature, "automated agent");
            return AccessOutcome::BotGranted;
        }

        let site = self.config.site_id();
        let count = self.meter.load(site);
        if count >= self.config.free_views() {
            tracing::debug!(site = %site, count, "free views exhausted");
            return AccessOutcome::Denied;
        }

        if !self.check_quota(path).await.allowed {
            return AccessOutcome::Denied;
        }

        self.meter.save(site, count.saturating_add(1));

        let gateway = Arc::clone(&self.gateway);
        let path = path.to_string();
        spawn_detached("record_hit", async move {
            if let Err(e) = gateway.record_hit(&path).await {
                tracing::debug!(path = %path, error = %e, "hit report failed");
            }
        });

        AccessOutcome::Granted
    }

    async fn check_quota(&self, path: &str) -> QuotaVerdict {
        let result = tokio::time::timeout(self.config.quota_timeout(), self.gateway.check_quota(path))
            .await
            .unwrap_or(Err(GatewayError::Timeout));

        result.unwrap_or_else(|e| {
            tracing::warn!(
                site = %self.config.site_id(),
                path = %path,
                error = %e,
                "quota check failed, allowing view"
            );
            self.metrics.record_fail_open();
            QuotaVerdict::allow()
        })
    }

    /// Get the configuration this decider applies.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Get the meter store.
    pub fn meter(&self) -> &MeterStore {
        &self.meter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::{GatewayCall, MockGateway, QuotaBehavior};
    use crate::infrastructure::storage::MemoryMeterBackend;
    use std::time::Duration;

    const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0";

    fn setup(free_views: u32, gateway: &MockGateway) -> (AccessDecider, MeterStore, Metrics) {
        let config = Configuration::builder()
            .with_site_id("news")
            .with_free_views(free_views)
            .build()
            .unwrap();
        let meter = MeterStore::new(Arc::new(MemoryMeterBackend::new()));
        let metrics = Metrics::new();
        let decider = AccessDecider::new(
            Arc::new(config),
            meter.clone(),
            Arc::new(gateway.clone()),
            metrics.clone(),
        );
        (decider, meter, metrics)
    }

    #[tokio::test]
    async fn test_bot_granted_without_meter_or_network() {
        let gateway = MockGateway::new();
        let (decider, meter, metrics) = setup(3, &gateway);
        meter.save("news", 9);

        let outcome = decider.decide("/a", "Mozilla/5.0 (compatible; GPTBot/1.0)").await;
        gateway.settle().await;

        assert_eq!(outcome, AccessOutcome::BotGranted);
        assert_eq!(meter.load("news"), 9);
        assert!(gateway.calls().is_empty());
        assert_eq!(metrics.bots_granted(), 1);
    }

    #[tokio::test]
    async fn test_granted_increments_and_reports_hit() {
        let gateway = MockGateway::new();
        let (decider, meter, metrics) = setup(3, &gateway);

        let outcome = decider.decide("/story", BROWSER).await;
        gateway.settle().await;

        assert_eq!(outcome, AccessOutcome::Granted);
        assert_eq!(meter.load("news"), 1);
        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::CheckQuota {
                    path: "/story".to_string()
                },
                GatewayCall::RecordHit {
                    path: "/story".to_string()
                },
            ]
        );
        assert_eq!(metrics.granted(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_meter_denies_without_network() {
        let gateway = MockGateway::new();
        let (decider, meter, metrics) = setup(3, &gateway);
        meter.save("news", 3);

        let outcome = decider.decide("/story", BROWSER).await;
        gateway.settle().await;

        assert_eq!(outcome, AccessOutcome::Denied);
        assert_eq!(meter.load("news"), 3);
        assert!(gateway.calls().is_empty());
        assert_eq!(metrics.denied(), 1);
    }

    #[tokio::test]
    async fn test_backend_deny_keeps_count() {
        let gateway = MockGateway::with_behavior(QuotaBehavior::Deny);
        let (decider, meter, _) = setup(3, &gateway);
        meter.save("news", 1);

        let outcome = decider.decide("/story", BROWSER).await;
        gateway.settle().await;

        assert_eq!(outcome, AccessOutcome::Denied);
        assert_eq!(meter.load("news"), 1);
        assert_eq!(gateway.quota_checks(), 1);
        assert!(gateway.hits().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_fails_open() {
        let gateway =
            MockGateway::with_behavior(QuotaBehavior::Fail(GatewayError::Transport("refused".into())));
        let (decider, meter, metrics) = setup(3, &gateway);
        meter.save("news", 2);

        let outcome = decider.decide("/story", BROWSER).await;

        assert_eq!(outcome, AccessOutcome::Granted);
        assert_eq!(meter.load("news"), 3);
        assert_eq!(metrics.quota_fail_open(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_backend_times_out_open() {
        let gateway = MockGateway::with_behavior(QuotaBehavior::Hang);
        let (decider, meter, metrics) = setup(3, &gateway);

        let started = tokio::time::Instant::now();
        let outcome = decider.decide("/story", BROWSER).await;

        assert_eq!(outcome, AccessOutcome::Granted);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(meter.load("news"), 1);
        assert_eq!(metrics.quota_fail_open(), 1);
    }

    #[tokio::test]
    async fn test_zero_free_views_always_denies() {
        let gateway = MockGateway::new();
        let (decider, _, _) = setup(0, &gateway);

        assert_eq!(decider.decide("/story", BROWSER).await, AccessOutcome::Denied);
        assert_eq!(gateway.quota_checks(), 0);
    }

    #[test]
    fn test_time_driver_is_the_only_runtime_requirement() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let gateway = MockGateway::with_behavior(QuotaBehavior::Deny);
        let (decider, meter, _) = setup(3, &gateway);

        let outcome = runtime.block_on(decider.decide("/story", BROWSER));

        assert_eq!(outcome, AccessOutcome::Denied);
        assert_eq!(meter.load("news"), 0);
    }
}
