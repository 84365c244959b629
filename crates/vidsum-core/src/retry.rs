use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::{Result, VidsumError};

/// Run `op` up to `1 + max_retries` times, sleeping with exponential
/// backoff between attempts. Errors for which `retryable` returns false
/// short-circuit immediately.
pub(crate) async fn with_backoff<T, F, Fut, P>(
    max_retries: u32,
    initial_backoff_ms: u64,
    mut op: F,
    retryable: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&VidsumError) -> bool,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= max_retries || !retryable(&e) {
                    return Err(e);
                }
                let backoff = initial_backoff_ms * 2u64.pow(attempt);
                sleep(Duration::from_millis(backoff)).await;
                attempt += 1;
            }
        }
    }
}
