use std::time::Duration;

use async_trait::async_trait;

/// Suspends the current task, used to wait between retries.
///
/// Injected so that tests can record the waits instead of actually sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
