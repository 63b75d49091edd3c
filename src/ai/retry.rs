//! Bounded retry for transient transport failures.

use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;

/// Send a request, retrying up to `max_retries` times on timeouts and
/// connection failures. HTTP status errors are returned as responses and
/// never retried here.
pub async fn send_with_retry<F, Fut>(
    max_retries: usize,
    target: &str,
    send: F,
) -> reqwest::Result<reqwest::Response>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = reqwest::Result<reqwest::Response>>,
{
    // 500ms, 1s, 2s, ... capped at 5s
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(5))
        .take(max_retries);

    RetryIf::spawn(strategy, send, |e: &reqwest::Error| {
        let transient = is_transient(e);
        if transient {
            tracing::warn!("Request to {} failed: {}. Will retry...", target, e);
        }
        transient
    })
    .await
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}
