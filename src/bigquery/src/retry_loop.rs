// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The retry loops used by [RetryExecutor][crate::executor::RetryExecutor].
//!
//! Most applications should use the executor. These functions are exposed for
//! libraries that manage their own configuration.

use crate::Result;
use crate::backoff_policy::BackoffPolicy;
use crate::error::Error;
use crate::retry_policy::RetryPolicy;
use crate::retry_state::RetryState;
use std::sync::Arc;
use std::time::Duration;

/// Runs the retry loop for a given asynchronous function.
///
/// This functions calls an inner function as long as (1) the retry policy
/// continues the loop, and (2) the inner function has not returned a
/// successful request.
///
/// In between calls the function waits the amount of time prescribed by the
/// backoff policy, using `sleep` to implement any sleep. Dropping the returned
/// future cancels the loop, including any pending sleep.
pub async fn retry_loop<F, S, Response>(
    mut inner: F,
    sleep: S,
    idempotent: bool,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
) -> Result<Response>
where
    F: AsyncFnMut() -> Result<Response>,
    S: AsyncFn(Duration) -> (),
{
    let mut state = RetryState::new(idempotent);
    loop {
        state.on_attempt();
        let error = match inner().await {
            Ok(r) => return Ok(r),
            Err(e) => e,
        };
        let delay = on_error(&state, retry_policy.as_ref(), backoff_policy.as_ref(), error)?;
        sleep(delay).await;
    }
}

/// Runs the retry loop for a given blocking function.
///
/// Behaves like [retry_loop], but calls `sleep` to block the current thread
/// between attempts.
pub fn retry_loop_blocking<F, S, Response>(
    mut inner: F,
    sleep: S,
    idempotent: bool,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
) -> Result<Response>
where
    F: FnMut() -> Result<Response>,
    S: Fn(Duration),
{
    let mut state = RetryState::new(idempotent);
    loop {
        state.on_attempt();
        let error = match inner() {
            Ok(r) => return Ok(r),
            Err(e) => e,
        };
        let delay = on_error(&state, retry_policy.as_ref(), backoff_policy.as_ref(), error)?;
        sleep(delay);
    }
}

// Returns the delay before the next attempt, or the error that stops the loop.
fn on_error(
    state: &RetryState,
    retry_policy: &dyn RetryPolicy,
    backoff_policy: &dyn BackoffPolicy,
    error: Error,
) -> Result<Duration> {
    let flow = retry_policy.on_error(state, error);
    if flow.is_continue() {
        let delay = backoff_policy.on_failure(state);
        tracing::debug!(
            attempt_count = state.attempt_count,
            ?delay,
            "retrying after transient error: {}",
            flow.error()
        );
        return Ok(delay);
    }
    if flow.is_exhausted() {
        tracing::warn!(
            attempt_count = state.attempt_count,
            elapsed = ?state.start.elapsed(),
            "retry policy exhausted: {}",
            flow.error()
        );
    } else {
        tracing::debug!(
            attempt_count = state.attempt_count,
            idempotent = state.idempotent,
            "request failed with a permanent error: {}",
            flow.error()
        );
    }
    Err(flow.into_error())
}
