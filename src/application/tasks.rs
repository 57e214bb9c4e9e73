//! Detached background work.
//!
//! Hit reporting and email registration are fire-and-forget: their results
//! never influence what the visitor sees.

use std::future::Future;

/// Spawn `fut` on the current tokio runtime without keeping its handle.
///
/// Outside a runtime the work is dropped and logged at debug level.
pub(crate) fn spawn_detached<F>(task: &'static str, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(fut);
        }
        Err(_) => {
            tracing::debug!(task, "no async runtime, background call dropped");
        }
    }
}
