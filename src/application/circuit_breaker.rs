//! Circuit breaker for backend calls.
//!
//! After repeated gateway failures the breaker opens and calls are skipped
//! outright, which the access decider then treats like any other failure:
//! the visitor is let through. Once the recovery timeout has passed a single
//! probe call is allowed to test whether the backend is back.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, calls go through
    Closed,
    /// Circuit is open due to failures, calls are skipped
    Open,
    /// Circuit is testing if the backend has recovered
    HalfOpen,
}

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening circuit
    pub failure_threshold: u32,
    /// Duration to wait before attempting recovery
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure: Option<Instant>,
    probe_in_flight: bool,
}

/// Circuit breaker guarding gateway calls.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<BreakerState>,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    /// Create a circuit breaker with custom configuration.
    pub fn new(config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                last_failure: None,
                probe_in_flight: false,
            }),
            config,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get the current circuit state.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Check if the circuit should allow a call.
    ///
    /// Returns `false` if the call should be skipped.
    pub fn allow_request(&self) -> bool {
        let mut guard = self.lock();
        let inner = &mut *guard;

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure
                    .map(|at| self.clock.now().saturating_duration_since(at))
                    .unwrap_or(Duration::MAX);

                if elapsed >= self.config.recovery_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                // Only one probe at a time
                if inner.probe_in_flight {
                    false
                } else {
                    inner.probe_in_flight = true;
                    true
                }
            }
        }
    }

    /// Take a permit for one guarded call, or `None` if it should be skipped.
    ///
    /// Unlike `allow_request`, the permit settles itself: dropping it without
    /// reporting an outcome records a failure, so a call cancelled mid-flight
    /// still frees the probe slot and still counts toward opening the circuit.
    pub fn acquire(&self) -> Option<CallPermit<'_>> {
        self.allow_request().then(|| CallPermit {
            breaker: self,
            settled: false,
        })
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = 0;
        inner.probe_in_flight = false;
        if inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Closed;
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        inner.last_failure = Some(self.clock.now());
        inner.probe_in_flight = false;

        match inner.state {
            CircuitState::HalfOpen => inner.state = CircuitState::Open,
            CircuitState::Closed if inner.consecutive_failures >= self.config.failure_threshold => {
                inner.state = CircuitState::Open;
            }
            _ => {}
        }
    }

    /// Get the number of consecutive failures.
    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Reset the circuit breaker to closed state.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.last_failure = None;
        inner.probe_in_flight = false;
    }
}

/// Permission to make one call through a `CircuitBreaker`.
#[must_use = "dropping the permit records a failure"]
#[derive(Debug)]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl CallPermit<'_> {
    /// The call completed successfully.
    pub fn succeed(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    /// The call failed.
    pub fn fail(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("guarded call abandoned, counted as failure");
            self.breaker.record_failure();
        }
    }
}
