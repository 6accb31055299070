use crate::app_config::Http;
use crate::resolver::ResolveError;
use std::future::Future;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{FixedInterval, jitter};
use tracing::warn;

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    retry_ms: u64,
    attempts: usize,
}

impl RetryPolicy {
    pub fn new(retry_ms: u64, attempts: usize) -> Self {
        RetryPolicy { retry_ms, attempts }
    }

    pub fn from_config(http: &Http) -> Self {
        RetryPolicy::new(http.retry_ms(), http.retry_attempts())
    }

    /// Runs `action`, retrying transient failures up to the configured number of attempts.
    pub async fn run<T, F, Fut>(&self, action: F) -> Result<T, ResolveError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResolveError>>,
    {
        let strategy = FixedInterval::from_millis(self.retry_ms).map(jitter).take(self.attempts);

        RetryIf::start(strategy, action, |e: &ResolveError| {
            let retry = e.is_transient();
            if retry {
                warn!("⚠️ Request failed: {}. Retrying...", e);
            }
            retry
        })
        .await
    }
}
