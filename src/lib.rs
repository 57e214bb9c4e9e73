//! # paywall-lite
//!
//! Core of an embeddable content gate: a per-site free-view meter, an
//! automated-agent disclosure, and a paywall / registration overlay.
//!
//! On every page load the widget decides one of three outcomes:
//!
//! | Outcome | When | Overlay |
//! |---|---|---|
//! | `BotGranted` | user agent looks like a crawler or AI agent | disclosure text, no gate |
//! | `Granted` | under the free-view limit and the backend agrees | none |
//! | `Denied` | limit reached, or the backend explicitly refuses | fade + paywall |
//!
//! The backend is advisory: when it is slow, unreachable or answers garbage
//! the visitor is let through.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paywall_lite::{Configuration, Paywall, RenderStyle};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Configuration::from_attributes([
//!     ("data-site", "daily-news"),
//!     ("data-free-views", "3"),
//!     ("data-show-registration", "true"),
//!     ("data-api", "https://api.example.com"),
//! ])?;
//!
//! let paywall = Paywall::builder().with_config(config).build()?;
//!
//! let mut page = paywall.open_page("/politics/story", "Mozilla/5.0 Firefox/128.0");
//! let outcome = page.ready().await;
//!
//! if outcome.is_denied() {
//!     page.request_registration();
//!     page.submit_email("reader@example.com");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Overlay Styles
//!
//! - **Fade** (default): the page is left alone until the decision; a denial
//!   attaches a bottom-half fade, an unlock dissolves it over 600 ms.
//! - **Blur**: content is blurred as soon as the page opens so nothing
//!   flashes before the decision; a grant removes the blur.
//!
//! ## Architecture
//!
//! - `domain`: configuration, classifier, meter format, outcomes and the
//!   overlay state machine. Pure, no I/O.
//! - `application`: ports, the meter store, the access decider, the overlay
//!   controller and page sessions.
//! - `infrastructure`: storage, HTTP gateway, renderer and the `Paywall`
//!   entry point.
//!
//! ## Logging
//!
//! The crate emits `tracing` events with structured fields (`site`, `path`,
//! `outcome`, `error`) and never installs a subscriber. Fail-open quota checks
//! are logged at `WARN`.

// Domain layer - pure gating logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    classifier::{classify, Classification, AUTOMATED_SIGNATURES},
    config::{ConfigError, Configuration, ConfigurationBuilder, RenderStyle},
    outcome::{AccessOutcome, QuotaVerdict},
    overlay::{transition, Effect, OverlayEvent, OverlayState, Transition},
};

pub use application::{
    circuit_breaker::{CallPermit, CircuitBreaker, CircuitBreakerConfig, CircuitState},
    controller::OverlayController,
    decider::AccessDecider,
    meter::MeterStore,
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Gateway, GatewayError, MeterBackend, Renderer, StoreError},
    session::PageSession,
    timer::RemovalTimer,
};

pub use infrastructure::{
    clock::SystemClock,
    gateway::{DisabledGateway, HttpGateway},
    renderer::LogRenderer,
    storage::MemoryMeterBackend,
    widget::{BuildError, Paywall, PaywallBuilder},
};

#[cfg(feature = "redis-storage")]
pub use infrastructure::redis_storage::{RedisMeterBackend, RedisMeterConfig};
