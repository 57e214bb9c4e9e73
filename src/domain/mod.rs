//! Domain layer - pure gating logic with no I/O.
//!
//! This layer contains the core concepts and invariants of the content gate:
//! - Widget configuration and its validation
//! - User-agent classification
//! - Access outcomes and backend quota verdicts
//! - The persisted meter format
//! - The overlay state machine
//!
//! All types in this layer are pure and easily testable.

pub mod classifier;
pub mod config;
pub mod meter;
pub mod outcome;
pub mod overlay;
