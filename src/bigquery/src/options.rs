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

//! Client configuration and per request options.
//!
//! The defaults follow the BigQuery service guidance: retry `5xx` errors and
//! `4xx` errors with only retryable reasons, up to five times, waiting 1s, 2s,
//! 4s, 8s, and 16s between attempts.
//!
//! Applications may change the defaults for all requests using
//! [ClientConfig], and for a single request using [RequestOptions].
//!
//! # Example
//! ```
//! # use google_cloud_bigquery::options::*;
//! # use google_cloud_bigquery::retry_policy::RetryableReasons;
//! use std::time::Duration;
//! let config = ClientConfig::default()
//!     .set_retries(10_u32)
//!     .set_timeout(Duration::from_secs(120))
//!     .set_retryable_reasons(RetryableReasons::default().with_reason("jobBackendError"));
//! # let _ = config;
//! ```

use crate::backoff_policy::{BackoffPolicy, BackoffPolicyArg, TruncatedExponential};
use crate::error::Error;
use crate::retry_policy::{
    DEFAULT_RETRIES, LimitedRetryCount, RetryPolicy, RetryPolicyArg, RetryableErrors,
    RetryableReasons,
};
use crate::retry_result::RetryResult;
use crate::retry_state::RetryState;
use std::sync::Arc;
use std::time::Duration;

/// The function used to wait between attempts in blocking calls.
///
/// The retry loop calls this function with the delay computed by the backoff
/// policy. The default implementation is [std::thread::sleep]. Tests may
/// replace it to observe the delays without waiting.
pub type DelayFn = Arc<dyn Fn(Duration) + Send + Sync>;

/// Configuration shared by all requests made through one executor.
#[derive(Clone, Default)]
pub struct ClientConfig {
    retries: Option<u32>,
    retryable_reasons: Option<RetryableReasons>,
    timeout: Option<Duration>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    backoff_policy: Option<Arc<dyn BackoffPolicy>>,
    delay: Option<DelayFn>,
}

impl ClientConfig {
    /// Sets the maximum number of retries after the initial attempt.
    ///
    /// Defaults to [DEFAULT_RETRIES]. Set to `0` to disable retries.
    pub fn set_retries<T: Into<u32>>(mut self, v: T) -> Self {
        self.retries = Some(v.into());
        self
    }

    /// The configured number of retries, if any.
    pub fn retries(&self) -> Option<u32> {
        self.retries
    }

    /// Sets the `reason` values treated as transient in `4xx` errors.
    pub fn set_retryable_reasons(mut self, v: RetryableReasons) -> Self {
        self.retryable_reasons = Some(v);
        self
    }

    /// The configured retryable reasons, if any.
    pub fn retryable_reasons(&self) -> Option<&RetryableReasons> {
        self.retryable_reasons.as_ref()
    }

    /// Sets the timeout for each attempt.
    ///
    /// Asynchronous calls enforce this timeout. An attempt that exceeds it
    /// fails with a [timeout][crate::error::Error::is_timeout] error, which is
    /// not retried.
    pub fn set_timeout<T: Into<Duration>>(mut self, v: T) -> Self {
        self.timeout = Some(v.into());
        self
    }

    /// The per-attempt timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Replaces the retry policy.
    ///
    /// This overrides [set_retries][Self::set_retries] and
    /// [set_retryable_reasons][Self::set_retryable_reasons].
    pub fn set_retry_policy<V: Into<RetryPolicyArg>>(mut self, v: V) -> Self {
        self.retry_policy = Some(v.into().into());
        self
    }

    /// Replaces the backoff policy.
    pub fn set_backoff_policy<V: Into<BackoffPolicyArg>>(mut self, v: V) -> Self {
        self.backoff_policy = Some(v.into().into());
        self
    }

    /// Replaces the function used to wait between attempts in blocking calls.
    ///
    /// # Example
    /// ```
    /// # use google_cloud_bigquery::options::ClientConfig;
    /// let config = ClientConfig::default().set_delay(|d| println!("would wait {d:?}"));
    /// # let _ = config;
    /// ```
    pub fn set_delay<F>(mut self, v: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.delay = Some(Arc::new(v));
        self
    }

    pub(crate) fn delay(&self) -> DelayFn {
        self.delay
            .clone()
            .unwrap_or_else(|| Arc::new(std::thread::sleep))
    }

    pub(crate) fn backoff_policy(&self, options: &RequestOptions) -> Arc<dyn BackoffPolicy> {
        options
            .backoff_policy
            .clone()
            .or_else(|| self.backoff_policy.clone())
            .unwrap_or_else(|| Arc::new(TruncatedExponential::default()))
    }

    pub(crate) fn retry_policy(&self, options: &RequestOptions) -> Arc<dyn RetryPolicy> {
        if let Some(p) = options.retry_policy.clone() {
            return p;
        }
        match (self.retry_policy.clone(), options.retries) {
            (Some(p), None) => return p,
            (Some(p), Some(retries)) => {
                return Arc::new(LimitedRetryCount::custom(ClientPolicy(p), retries));
            }
            (None, _) => {}
        }
        let retries = options
            .retries
            .or(self.retries)
            .unwrap_or(DEFAULT_RETRIES);
        let reasons = self.retryable_reasons.clone().unwrap_or_default();
        Arc::new(LimitedRetryCount::custom(
            RetryableErrors::new(reasons),
            retries,
        ))
    }
}

// The client's retry policy, limited by a per-request retry count.
#[derive(Debug)]
struct ClientPolicy(Arc<dyn RetryPolicy>);

impl RetryPolicy for ClientPolicy {
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
        self.0.on_error(state, error)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("retries", &self.retries)
            .field("retryable_reasons", &self.retryable_reasons)
            .field("timeout", &self.timeout)
            .field("retry_policy", &self.retry_policy)
            .field("backoff_policy", &self.backoff_policy)
            .field("delay", &self.delay.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// A set of options configuring a single request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    idempotent: Option<bool>,
    retries: Option<u32>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    backoff_policy: Option<Arc<dyn BackoffPolicy>>,
}

impl RequestOptions {
    /// Gets the idempotency
    pub fn idempotent(&self) -> Option<bool> {
        self.idempotent
    }

    /// Treat the underlying RPC as idempotent, or not.
    ///
    /// Errors from non-idempotent requests are never retried. For example,
    /// updating a table without an `etag` may apply the same change twice,
    /// such requests should set this to `false`.
    ///
    /// Requests are idempotent unless configured otherwise.
    pub fn set_idempotency(&mut self, value: bool) {
        self.idempotent = Some(value);
    }

    /// Overrides the number of retries for this request.
    ///
    /// If the client has a custom [retry policy][ClientConfig::set_retry_policy]
    /// this limit applies on top of it. The client policy still decides which
    /// errors are retryable, and any limit it has of its own still applies.
    pub fn set_retries<T: Into<u32>>(&mut self, v: T) {
        self.retries = Some(v.into());
    }

    /// Gets the retry count override, if any.
    pub fn retries(&self) -> Option<u32> {
        self.retries
    }

    /// Sets the retry policy for this request.
    pub fn set_retry_policy<V: Into<RetryPolicyArg>>(&mut self, v: V) {
        self.retry_policy = Some(v.into().into());
    }

    /// Get the current retry policy override, if any.
    pub fn retry_policy(&self) -> &Option<Arc<dyn RetryPolicy>> {
        &self.retry_policy
    }

    /// Sets the backoff policy for this request.
    pub fn set_backoff_policy<V: Into<BackoffPolicyArg>>(&mut self, v: V) {
        self.backoff_policy = Some(v.into().into());
    }

    /// Get the current backoff policy override, if any.
    pub fn backoff_policy(&self) -> &Option<Arc<dyn BackoffPolicy>> {
        &self.backoff_policy
    }
}
