//! Script loading and bounded readiness waits.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::{self, Either, LocalBoxFuture};
use futures::FutureExt;

use crate::LoadError;

/// Fetches and evaluates a script source.
#[async_trait(?Send)]
pub trait ScriptLoader {
    /// Load `source`, resolving once the script has run.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be fetched or evaluated.
    async fn load(&self, source: &str) -> Result<(), LoadError>;
}

/// Source of one-shot delays.
pub trait Timer {
    /// A future resolving after `duration`.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Timer backed by the tokio clock.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(not(target_arch = "wasm32"))]
impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed_local()
    }
}

/// Run `work` until it completes or `timeout` elapses on `timer`.
///
/// Returns `None` on timeout; `work` is dropped unfinished.
pub async fn with_deadline<F>(work: F, timeout: Duration, timer: &dyn Timer) -> Option<F::Output>
where
    F: std::future::Future,
{
    let work = std::pin::pin!(work);
    match future::select(work, timer.sleep(timeout)).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}
