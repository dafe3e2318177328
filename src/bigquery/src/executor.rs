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

//! Runs BigQuery RPCs with retries.

use crate::Result;
use crate::error::Error;
use crate::options::{ClientConfig, RequestOptions};
use crate::retry_loop::{retry_loop, retry_loop_blocking};
use std::time::Duration;

/// Executes a request, retrying transient failures.
///
/// The executor holds the retry configuration for a client. Each call to
/// [execute][Self::execute] starts a new retry loop, with its own attempt
/// count, so a single executor may be shared by many concurrent requests.
///
/// With the default configuration the executor retries up to five times,
/// waiting 1s, 2s, 4s, 8s, and 16s between attempts. Only `5xx` errors and
/// `4xx` errors where every reason is `backendError` or `rateLimitExceeded` are
/// retried. Any other error is returned from the first attempt that produced
/// it.
///
/// # Example
/// ```
/// # use google_cloud_bigquery::executor::RetryExecutor;
/// # use google_cloud_bigquery::options::ClientConfig;
/// # use google_cloud_bigquery::error::Error;
/// let executor = RetryExecutor::new(ClientConfig::default())
///     .with_delay(|_| {});
/// let mut attempts = 0;
/// let response = executor.execute(|| {
///     attempts += 1;
///     if attempts < 3 {
///         return Err(Error::http_without_payload(503, http::HeaderMap::new()));
///     }
///     Ok("done")
/// })?;
/// assert_eq!(response, "done");
/// assert_eq!(attempts, 3);
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryExecutor {
    config: ClientConfig,
}

impl RetryExecutor {
    /// Creates a new executor with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Replaces the function used to wait between blocking attempts.
    pub fn with_delay<F>(mut self, delay: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.config = self.config.set_delay(delay);
        self
    }

    /// The configuration used by this executor.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Calls `attempt` until it succeeds, fails with a permanent error, or the
    /// retry policy is exhausted.
    ///
    /// Blocks the current thread between attempts. Use
    /// [execute_async][Self::execute_async] in asynchronous code.
    pub fn execute<T, F>(&self, attempt: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        self.execute_with_options(&RequestOptions::default(), attempt)
    }

    /// Like [execute][Self::execute], with per request overrides.
    pub fn execute_with_options<T, F>(&self, options: &RequestOptions, attempt: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let delay = self.config.delay();
        retry_loop_blocking(
            attempt,
            |d| delay(d),
            options.idempotent().unwrap_or(true),
            self.config.retry_policy(options),
            self.config.backoff_policy(options),
        )
    }

    /// Calls `attempt` until it succeeds, fails with a permanent error, or the
    /// retry policy is exhausted.
    ///
    /// Waits between attempts using [tokio::time::sleep]. If the configuration
    /// sets a [timeout][ClientConfig::set_timeout], each attempt that takes
    /// longer is cancelled and the call fails with a timeout error. Dropping
    /// the returned future cancels the retry loop.
    pub async fn execute_async<T, F>(&self, attempt: F) -> Result<T>
    where
        F: AsyncFnMut() -> Result<T>,
    {
        self.execute_async_with_options(&RequestOptions::default(), attempt)
            .await
    }

    /// Like [execute_async][Self::execute_async], with per request overrides.
    pub async fn execute_async_with_options<T, F>(
        &self,
        options: &RequestOptions,
        mut attempt: F,
    ) -> Result<T>
    where
        F: AsyncFnMut() -> Result<T>,
    {
        let timeout = self.config.timeout();
        let inner = async || match timeout {
            None => attempt().await,
            Some(t) => tokio::time::timeout(t, attempt())
                .await
                .unwrap_or_else(|e| Err(Error::timeout(e))),
        };
        retry_loop(
            inner,
            async |d| tokio::time::sleep(d).await,
            options.idempotent().unwrap_or(true),
            self.config.retry_policy(options),
            self.config.backoff_policy(options),
        )
        .await
    }
}
