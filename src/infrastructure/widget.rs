//! Widget entry point.
//!
//! `Paywall` wires the configuration to its adapters once per site and hands
//! out a `PageSession` for every page load.

use crate::application::{
    controller::OverlayController,
    decider::AccessDecider,
    meter::MeterStore,
    metrics::Metrics,
    ports::{Clock, Gateway, GatewayError, MeterBackend, Renderer},
    session::PageSession,
};
use crate::domain::config::Configuration;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::gateway::{DisabledGateway, HttpGateway};
use crate::infrastructure::renderer::LogRenderer;
use crate::infrastructure::storage::MemoryMeterBackend;
use std::sync::Arc;

/// Error returned when building a `Paywall` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The HTTP gateway for the configured api base could not be created
    Gateway(GatewayError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Gateway(e) => write!(f, "gateway setup failed: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<GatewayError> for BuildError {
    fn from(e: GatewayError) -> Self {
        BuildError::Gateway(e)
    }
}

/// Builder for constructing a `Paywall`.
#[derive(Debug, Default)]
pub struct PaywallBuilder {
    config: Option<Configuration>,
    backend: Option<Arc<dyn MeterBackend>>,
    gateway: Option<Arc<dyn Gateway>>,
    renderer: Option<Arc<dyn Renderer>>,
    clock: Option<Arc<dyn Clock>>,
}

impl PaywallBuilder {
    /// Use this configuration (default: `Configuration::default()`).
    pub fn with_config(mut self, config: Configuration) -> Self {
        self.config = Some(config);
        self
    }

    /// Store visit counters in this medium (default: in-memory).
    pub fn with_backend(mut self, backend: Arc<dyn MeterBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Talk to the backend through this gateway.
    ///
    /// Default: `HttpGateway` when the configuration has an api base,
    /// `DisabledGateway` otherwise.
    pub fn with_gateway(mut self, gateway: Arc<dyn Gateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Draw the overlay with this renderer (default: `LogRenderer`).
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Use a custom clock for the HTTP gateway's circuit breaker.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the paywall.
    ///
    /// # Errors
    /// Returns `BuildError::Gateway` if the HTTP client cannot be created.
    pub fn build(self) -> Result<Paywall, BuildError> {
        let config = Arc::new(self.config.unwrap_or_default());
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));

        let gateway: Arc<dyn Gateway> = match (self.gateway, config.api_base()) {
            (Some(gateway), _) => gateway,
            (None, Some(api_base)) => Arc::new(HttpGateway::new(
                api_base,
                config.site_id(),
                config.request_timeout(),
                clock,
            )?),
            (None, None) => {
                tracing::debug!(site = %config.site_id(), "no api base, backend calls disabled");
                Arc::new(DisabledGateway)
            }
        };

        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(MemoryMeterBackend::new()));
        let renderer = self.renderer.unwrap_or_else(|| Arc::new(LogRenderer::new()));

        Ok(Paywall {
            config,
            meter: MeterStore::new(backend),
            gateway,
            renderer,
            metrics: Metrics::new(),
        })
    }
}

/// Content gate for one site.
///
/// # Example
///
/// ```
/// use paywall_lite::{AccessOutcome, Configuration, Paywall};
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let config = Configuration::builder()
///     .with_site_id("daily-news")
///     .with_free_views(1)
///     .build()
///     .unwrap();
/// let paywall = Paywall::builder().with_config(config).build().unwrap();
///
/// let ua = "Mozilla/5.0 (Macintosh) Safari/605.1.15";
/// assert_eq!(paywall.open_page("/a", ua).ready().await, AccessOutcome::Granted);
/// assert_eq!(paywall.open_page("/b", ua).ready().await, AccessOutcome::Denied);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Paywall {
    config: Arc<Configuration>,
    meter: MeterStore,
    gateway: Arc<dyn Gateway>,
    renderer: Arc<dyn Renderer>,
    metrics: Metrics,
}

impl Paywall {
    /// Create a builder.
    pub fn builder() -> PaywallBuilder {
        PaywallBuilder::default()
    }

    /// Start a page load.
    ///
    /// In blur style the content is blurred before this returns.
    pub fn open_page(&self, path: &str, user_agent: &str) -> PageSession {
        let decider = AccessDecider::new(
            Arc::clone(&self.config),
            self.meter.clone(),
            Arc::clone(&self.gateway),
            self.metrics.clone(),
        );
        let controller = OverlayController::new(
            Arc::clone(&self.config),
            Arc::clone(&self.renderer),
            self.meter.clone(),
            Arc::clone(&self.gateway),
            self.metrics.clone(),
            path,
        );
        PageSession::new(path, user_agent, decider, controller)
    }

    /// Get the configuration.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Get the shared metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Get the meter store.
    pub fn meter(&self) -> &MeterStore {
        &self.meter
    }
}
