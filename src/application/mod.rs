//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic for a page load:
//! - Meter store (best-effort visit counter)
//! - Access decider (bot check, meter, backend quota, fail-open)
//! - Overlay controller (executes state machine effects)
//! - Page session (one decision per page load, visitor input)
//! - Circuit breaker and metrics
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod circuit_breaker;
pub mod controller;
pub mod decider;
pub mod meter;
pub mod metrics;
pub mod ports;
pub mod session;
pub(crate) mod tasks;
pub mod timer;
