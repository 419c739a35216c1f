// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{HarnessError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::trace;

/// Run `check` every `interval` until it yields a value or `timeout` elapses.
///
/// `Ok(None)` means "not yet"; an error aborts the poll immediately. The
/// deadline is fixed up front and bounds both the checks and the sleeps
/// between them.
pub async fn poll<T, F, Fut>(
    interval: Duration,
    timeout: Duration,
    what: &str,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match timeout_at(deadline, check()).await {
            Ok(Ok(Some(value))) => return Ok(value),
            Ok(Ok(None)) => trace!(attempt, "{} not satisfied yet", what),
            Ok(Err(e)) => return Err(e),
            Err(_) => break,
        }

        sleep_until((Instant::now() + interval).min(deadline)).await;
        if Instant::now() >= deadline {
            break;
        }
    }

    Err(HarnessError::Timeout(timeout, what.to_string()))
}
