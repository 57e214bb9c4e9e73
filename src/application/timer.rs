//! Cancellable one-shot timer for the delayed fade removal.

use std::time::Duration;
use tokio::task::JoinHandle;

/// How long the fade takes to dissolve before it is detached.
pub const FADE_REMOVAL_DELAY: Duration = Duration::from_millis(600);

/// One-shot timer holding at most one pending action.
///
/// Scheduling replaces (and cancels) the previous action. Dropping the timer
/// cancels whatever is still pending.
#[derive(Debug, Default)]
pub struct RemovalTimer {
    pending: Option<JoinHandle<()>>,
}

impl RemovalTimer {
    /// Create an idle timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` after `delay`, cancelling any pending action first.
    ///
    /// Without an async runtime there is nothing to wait on, so the action
    /// runs immediately.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                self.pending = Some(handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    action();
                }));
            }
            Err(_) => {
                tracing::debug!("no async runtime, running delayed action now");
                action();
            }
        }
    }

    /// Cancel the pending action, if any.
    ///
    /// Returns `true` if an action was still waiting to run.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Check if an action is waiting to run.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for RemovalTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
