//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Meter storage (in-memory map, Redis)
//! - Backend gateway (HTTP JSON, disabled)
//! - Rendering (log-only default)
//! - The `Paywall` entry point wiring everything together

pub mod clock;
pub mod gateway;
pub mod renderer;
pub mod storage;
pub mod widget;

#[cfg(feature = "redis-storage")]
pub mod redis_storage;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides scripted and recording test doubles
/// for the gateway, the renderer, the clock and the log output.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// paywall-lite = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
