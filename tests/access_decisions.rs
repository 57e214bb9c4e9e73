//! End-to-end access decisions through `Paywall` page sessions.

use paywall_lite::infrastructure::mocks::{MockGateway, MockRenderer, QuotaBehavior, RenderCall};
use paywall_lite::{
    AccessOutcome, Configuration, GatewayError, MemoryMeterBackend, OverlayState, Paywall,
};
use std::sync::Arc;

const HUMAN_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/126.0 Safari/537.36";
const GPTBOT_UA: &str = "Mozilla/5.0 (compatible; GPTBot/1.0)";

struct Harness {
    paywall: Paywall,
    backend: Arc<MemoryMeterBackend>,
    gateway: MockGateway,
    renderer: MockRenderer,
}

fn harness(free_views: u32, behavior: QuotaBehavior) -> Harness {
    let backend = Arc::new(MemoryMeterBackend::new());
    let gateway = MockGateway::with_behavior(behavior);
    let renderer = MockRenderer::new();
    let config = Configuration::builder()
        .with_site_id("gazette")
        .with_free_views(free_views)
        .with_registration(true)
        .build()
        .unwrap();

    let paywall = Paywall::builder()
        .with_config(config)
        .with_backend(backend.clone())
        .with_gateway(Arc::new(gateway.clone()))
        .with_renderer(Arc::new(renderer.clone()))
        .build()
        .unwrap();

    Harness {
        paywall,
        backend,
        gateway,
        renderer,
    }
}

#[tokio::test]
async fn unreachable_backend_under_quota_grants_and_counts() {
    let h = harness(
        3,
        QuotaBehavior::Fail(GatewayError::Transport("connection refused".to_string())),
    );
    h.backend.insert_raw("pw_meter_gazette", "2");

    let mut page = h.paywall.open_page("/story", HUMAN_UA);
    assert_eq!(page.ready().await, AccessOutcome::Granted);

    assert_eq!(h.backend.raw("pw_meter_gazette").as_deref(), Some("3"));
    assert_eq!(page.state(), OverlayState::Hidden);
    assert_eq!(h.paywall.metrics().quota_fail_open(), 1);
}

#[tokio::test]
async fn exhausted_quota_denies_without_network() {
    let h = harness(3, QuotaBehavior::Allow);
    h.backend.insert_raw("pw_meter_gazette", "3");

    let mut page = h.paywall.open_page("/story", HUMAN_UA);
    assert_eq!(page.ready().await, AccessOutcome::Denied);
    h.gateway.settle().await;

    assert!(h.gateway.calls().is_empty());
    assert_eq!(page.state(), OverlayState::FadeAndPaywall);
    assert_eq!(h.backend.raw("pw_meter_gazette").as_deref(), Some("3"));
    assert!(h.renderer.contains(&RenderCall::ShowPaywall {
        offer_registration: true
    }));
}

#[tokio::test]
async fn crawler_is_granted_whatever_the_count() {
    for count in ["0", "2", "3", "250", "garbage"] {
        let h = harness(3, QuotaBehavior::Deny);
        h.backend.insert_raw("pw_meter_gazette", count);

        let mut page = h.paywall.open_page("/story", GPTBOT_UA);
        assert_eq!(page.ready().await, AccessOutcome::BotGranted);
        h.gateway.settle().await;

        assert!(h.gateway.calls().is_empty());
        assert_eq!(h.backend.raw("pw_meter_gazette").as_deref(), Some(count));
        assert!(h.renderer.contains(&RenderCall::ShowBotMessage(
            "This content is protected.".to_string()
        )));
    }
}

#[tokio::test]
async fn allowed_views_count_up_to_the_limit() {
    let h = harness(3, QuotaBehavior::Allow);

    for expected in 1..=3 {
        let mut page = h.paywall.open_page("/story", HUMAN_UA);
        assert_eq!(page.ready().await, AccessOutcome::Granted);
        assert_eq!(h.paywall.meter().load("gazette"), expected);
    }

    let mut page = h.paywall.open_page("/story", HUMAN_UA);
    assert_eq!(page.ready().await, AccessOutcome::Denied);
    h.gateway.settle().await;

    assert_eq!(h.gateway.quota_checks(), 3);
    assert_eq!(h.gateway.hits().len(), 3);
}

#[tokio::test]
async fn explicit_backend_refusal_denies() {
    let h = harness(3, QuotaBehavior::Deny);

    let mut page = h.paywall.open_page("/story", HUMAN_UA);
    assert_eq!(page.ready().await, AccessOutcome::Denied);
    assert_eq!(h.paywall.meter().load("gazette"), 0);
}

#[tokio::test]
async fn corrupted_counter_reads_as_zero() {
    for raw in ["{oops", "-1", "2.5", "null", ""] {
        let h = harness(1, QuotaBehavior::Allow);
        h.backend.insert_raw("pw_meter_gazette", raw);

        let mut page = h.paywall.open_page("/story", HUMAN_UA);
        assert_eq!(page.ready().await, AccessOutcome::Granted, "raw value {:?}", raw);
        assert_eq!(h.backend.raw("pw_meter_gazette").as_deref(), Some("1"));
    }
}

#[tokio::test]
async fn disabled_storage_still_decides() {
    let h = harness(3, QuotaBehavior::Allow);
    h.backend.set_available(false);

    let mut page = h.paywall.open_page("/story", HUMAN_UA);
    assert_eq!(page.ready().await, AccessOutcome::Granted);
    assert_eq!(page.state(), OverlayState::Hidden);
}

#[tokio::test]
async fn ready_decides_only_once() {
    let h = harness(3, QuotaBehavior::Allow);

    let mut page = h.paywall.open_page("/story", HUMAN_UA);
    assert_eq!(page.outcome(), None);
    assert_eq!(page.ready().await, AccessOutcome::Granted);
    assert_eq!(page.ready().await, AccessOutcome::Granted);
    h.gateway.settle().await;

    assert_eq!(page.outcome(), Some(AccessOutcome::Granted));
    assert_eq!(h.gateway.quota_checks(), 1);
    assert_eq!(h.paywall.meter().load("gazette"), 1);
    assert_eq!(h.paywall.metrics().snapshot().total_decisions(), 1);
}
