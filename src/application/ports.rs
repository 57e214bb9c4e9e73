//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports: the storage
//! medium behind the meter, the backend behind the gateway, and the page
//! surface behind the renderer.

use crate::domain::outcome::QuotaVerdict;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Instant;

/// Port for obtaining current time.
///
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Error raised by a meter storage medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The medium is disabled or cannot be reached
    Unavailable(String),
    /// The medium refused the operation (quota, permissions)
    Rejected(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(reason) => write!(f, "storage unavailable: {}", reason),
            StoreError::Rejected(reason) => write!(f, "storage rejected write: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// Port for the persisted key-value medium holding visit counters.
///
/// Adapters report failures honestly; the `MeterStore` wrapping them is the
/// one that degrades failures to the zero-count default.
pub trait MeterBackend: Send + Sync + Debug {
    /// Read the raw value stored under `key`.
    ///
    /// # Returns
    /// `Ok(None)` if the key has never been written.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Error raised by a gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Connection, DNS or TLS failure
    Transport(String),
    /// Backend answered with a non-success status
    Status(u16),
    /// Backend answered with a body that is not a verdict
    Decode(String),
    /// The call did not complete in time
    Timeout,
    /// Calls are short-circuited after repeated failures
    CircuitOpen,
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Transport(e) => write!(f, "transport error: {}", e),
            GatewayError::Status(code) => write!(f, "backend returned status {}", code),
            GatewayError::Decode(e) => write!(f, "undecodable response: {}", e),
            GatewayError::Timeout => write!(f, "gateway call timed out"),
            GatewayError::CircuitOpen => write!(f, "circuit open, backend call skipped"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Port for the metering backend.
///
/// The site id is part of the adapter's configuration, so calls only carry
/// the page path (and the email for registration).
#[async_trait]
pub trait Gateway: Send + Sync + Debug {
    /// Ask the backend whether this page view is still within quota.
    async fn check_quota(&self, path: &str) -> Result<QuotaVerdict, GatewayError>;

    /// Tell the backend a metered view was granted.
    async fn record_hit(&self, path: &str) -> Result<(), GatewayError>;

    /// Send a visitor's email from the registration prompt.
    async fn register_email(&self, email: &str, path: &str) -> Result<(), GatewayError>;
}

/// Port for the page surface the overlay is drawn on.
///
/// Implementations own the markup and styling; the controller only decides
/// which of these to call and when. All methods must be idempotent.
pub trait Renderer: Send + Sync + Debug {
    /// Blur the content element.
    fn blur_content(&self);

    /// Remove the blur from the content element.
    fn unblur_content(&self);

    /// Attach the bottom-half fade over the content element.
    fn show_fade(&self);

    /// Start dissolving the fade; it stays attached until `remove_fade`.
    fn begin_fade_out(&self);

    /// Detach the fade element.
    fn remove_fade(&self);

    /// Replace the content with the bot disclosure text.
    fn show_bot_message(&self, message: &str);

    /// Show the blocking paywall prompt.
    fn show_paywall(&self, offer_registration: bool);

    /// Show the email registration prompt.
    fn show_registration_prompt(&self);

    /// Remove the visible prompt, if any.
    fn dismiss_prompt(&self);

    /// Show a blocking validation message.
    fn show_validation_message(&self, message: &str);
}
