//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of application logic.

pub mod clock;
pub mod gateway;
pub mod layer;
pub mod renderer;

pub use clock::MockClock;
pub use gateway::{GatewayCall, MockGateway, QuotaBehavior};
pub use layer::{CapturedEvent, MockCaptureLayer};
pub use renderer::{MockRenderer, RenderCall};
