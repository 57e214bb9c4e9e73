//! Scripted gateway for testing.

use crate::application::ports::{Gateway, GatewayError};
use crate::domain::outcome::QuotaVerdict;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// How the mock answers quota checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaBehavior {
    /// Answer `{allowed: true}`
    Allow,
    /// Answer `{allowed: false}`
    Deny,
    /// Fail with the given error
    Fail(GatewayError),
    /// Never answer
    Hang,
}

/// A call received by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CheckQuota { path: String },
    RecordHit { path: String },
    RegisterEmail { email: String, path: String },
}

#[derive(Debug)]
struct MockGatewayState {
    quota: QuotaBehavior,
    fail_side_calls: bool,
    calls: Vec<GatewayCall>,
}

/// Gateway whose answers are scripted by the test.
///
/// Clones share the script and the call log.
#[derive(Debug, Clone)]
pub struct MockGateway {
    state: Arc<Mutex<MockGatewayState>>,
}

impl MockGateway {
    /// Create a gateway that allows every quota check.
    pub fn new() -> Self {
        Self::with_behavior(QuotaBehavior::Allow)
    }

    /// Create a gateway answering quota checks with `behavior`.
    pub fn with_behavior(behavior: QuotaBehavior) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockGatewayState {
                quota: behavior,
                fail_side_calls: false,
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockGatewayState> {
        self.state
            .lock()
            .expect("MockGateway mutex poisoned - a test thread panicked while holding the lock")
    }

    /// Change how quota checks are answered.
    pub fn set_quota_behavior(&self, behavior: QuotaBehavior) {
        self.lock().quota = behavior;
    }

    /// Make hit reports and registrations fail.
    pub fn fail_side_calls(&self, fail: bool) {
        self.lock().fail_side_calls = fail;
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// Number of quota checks received.
    pub fn quota_checks(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, GatewayCall::CheckQuota { .. }))
            .count()
    }

    /// Paths of the hit reports received.
    pub fn hits(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                GatewayCall::RecordHit { path } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// `(email, path)` of the registrations received.
    pub fn registrations(&self) -> Vec<(String, String)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                GatewayCall::RegisterEmail { email, path } => Some((email.clone(), path.clone())),
                _ => None,
            })
            .collect()
    }

    /// Yield to the runtime so detached hit and registration calls land.
    pub async fn settle(&self) {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    fn side_call(&self, call: GatewayCall) -> Result<(), GatewayError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.fail_side_calls {
            Err(GatewayError::Status(503))
        } else {
            Ok(())
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn check_quota(&self, path: &str) -> Result<QuotaVerdict, GatewayError> {
        let behavior = {
            let mut state = self.lock();
            state.calls.push(GatewayCall::CheckQuota {
                path: path.to_string(),
            });
            state.quota.clone()
        };

        match behavior {
            QuotaBehavior::Allow => Ok(QuotaVerdict::allow()),
            QuotaBehavior::Deny => Ok(QuotaVerdict::deny()),
            QuotaBehavior::Fail(e) => Err(e),
            QuotaBehavior::Hang => std::future::pending().await,
        }
    }

    async fn record_hit(&self, path: &str) -> Result<(), GatewayError> {
        self.side_call(GatewayCall::RecordHit {
            path: path.to_string(),
        })
    }

    async fn register_email(&self, email: &str, path: &str) -> Result<(), GatewayError> {
        self.side_call(GatewayCall::RegisterEmail {
            email: email.to_string(),
            path: path.to_string(),
        })
    }
}
