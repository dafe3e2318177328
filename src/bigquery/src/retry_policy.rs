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

//! Defines the retry policies for BigQuery.
//!
//! BigQuery reports transient failures in two ways:
//!
//! - Any `5xx` HTTP status code. These are always retried.
//! - A `4xx` HTTP status code where the body lists one or more errors, and
//!   **every** listed error has a retryable `reason`. The default retryable
//!   reasons are `backendError` and `rateLimitExceeded`. If any reason is not
//!   retryable the error as a whole is permanent.
//!
//! All other errors are permanent. This includes errors without an HTTP status
//! code, such as I/O errors or timeouts: the policy only trusts the
//! service's own description of transient failures.
//!
//! # Example
//! ```
//! # use google_cloud_bigquery::retry_policy::*;
//! let policy = RetryableErrors::default().with_retry_limit(3);
//! # let _ = policy;
//! ```

use crate::error::Error;
use crate::retry_result::RetryResult;
use crate::retry_state::RetryState;
use std::collections::BTreeSet;
use std::sync::Arc;

/// The number of retries after the first attempt, unless configured otherwise.
pub const DEFAULT_RETRIES: u32 = 5;

/// The `reason` values BigQuery uses for transient errors.
pub const DEFAULT_RETRYABLE_REASONS: [&str; 2] = ["backendError", "rateLimitExceeded"];

/// The default retry policy for BigQuery.
///
/// Retries the errors described in the [module documentation][self], at most
/// [DEFAULT_RETRIES] times.
pub fn bigquery_default() -> LimitedRetryCount<RetryableErrors> {
    RetryableErrors::default().with_retry_limit(DEFAULT_RETRIES)
}

/// Determines how errors are handled in the retry loop.
///
/// Implementations of this trait determine if errors are retryable, and for
/// how long the retry loop may continue.
pub trait RetryPolicy: Send + Sync + std::fmt::Debug {
    /// Query the retry policy after an error.
    ///
    /// # Parameters
    /// * `state` - the state of the retry loop, including the number of
    ///   attempts made so far, and whether the request is idempotent.
    /// * `error` - the last error received from a request. Not all are server
    ///   errors. The request may have failed before reaching the service.
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult;
}

/// A helper type to use [RetryPolicy] in client and request options.
#[derive(Clone, Debug)]
pub struct RetryPolicyArg(Arc<dyn RetryPolicy>);

impl<T> std::convert::From<T> for RetryPolicyArg
where
    T: RetryPolicy + 'static,
{
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn RetryPolicy>> for RetryPolicyArg {
    fn from(value: Arc<dyn RetryPolicy>) -> Self {
        Self(value)
    }
}

impl From<RetryPolicyArg> for Arc<dyn RetryPolicy> {
    fn from(value: RetryPolicyArg) -> Arc<dyn RetryPolicy> {
        value.0
    }
}

/// Extension trait for [`RetryPolicy`]
pub trait RetryPolicyExt: RetryPolicy + Sized {
    /// Decorate a [`RetryPolicy`] to limit the number of retries.
    ///
    /// The limit counts retries, not attempts. With a limit of `5` the request
    /// is attempted at most six times: the initial attempt and five retries.
    ///
    /// # Example
    /// ```
    /// # use google_cloud_bigquery::retry_policy::*;
    /// let policy = RetryableErrors::default().with_retry_limit(10);
    /// # let _ = policy;
    /// ```
    fn with_retry_limit(self, maximum_retries: u32) -> LimitedRetryCount<Self> {
        LimitedRetryCount::custom(self, maximum_retries)
    }
}

impl<T: RetryPolicy> RetryPolicyExt for T {}

/// The set of `reason` values treated as transient.
///
/// # Example
/// ```
/// # use google_cloud_bigquery::retry_policy::RetryableReasons;
/// let reasons = RetryableReasons::default().with_reason("jobBackendError");
/// assert!(reasons.contains("backendError"));
/// assert!(reasons.contains("jobBackendError"));
/// assert!(!reasons.contains("invalid"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryableReasons(BTreeSet<String>);

impl RetryableReasons {
    /// Creates a set containing exactly the given reasons.
    pub fn new<I, V>(reasons: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self(reasons.into_iter().map(|v| v.into()).collect())
    }

    /// Adds one reason to the set.
    pub fn with_reason<V: Into<String>>(mut self, reason: V) -> Self {
        self.0.insert(reason.into());
        self
    }

    /// Returns true if `reason` is in the set.
    pub fn contains(&self, reason: &str) -> bool {
        self.0.contains(reason)
    }

    /// Returns true if `reasons` is not empty and every item is in the set.
    ///
    /// A single reason outside the set makes the whole list non-retryable.
    pub fn all_retryable<'a, I>(&self, reasons: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut any = false;
        for reason in reasons {
            if !self.contains(reason) {
                return false;
            }
            any = true;
        }
        any
    }
}

impl Default for RetryableReasons {
    fn default() -> Self {
        Self::new(DEFAULT_RETRYABLE_REASONS)
    }
}

/// Follows the BigQuery guidance on which errors are transient.
///
/// This policy must be decorated to limit the number of retry attempts, see
/// [RetryPolicyExt::with_retry_limit].
///
/// Errors on non-idempotent requests are always permanent.
#[derive(Clone, Debug, Default)]
pub struct RetryableErrors {
    reasons: RetryableReasons,
}

impl RetryableErrors {
    /// Creates a policy that treats `reasons` as transient in `4xx` errors.
    pub fn new(reasons: RetryableReasons) -> Self {
        Self { reasons }
    }

    /// The reasons treated as transient.
    pub fn reasons(&self) -> &RetryableReasons {
        &self.reasons
    }

    /// Returns true if `error` describes a transient failure.
    ///
    /// This ignores idempotency and retry limits, it only classifies the
    /// error itself.
    pub fn is_transient(&self, error: &Error) -> bool {
        match error.http_status_code() {
            None => false,
            Some(500..=599) => true,
            Some(400..=499) => error
                .error_body()
                .map(|body| self.reasons.all_retryable(body.reasons()))
                .unwrap_or(false),
            Some(_) => false,
        }
    }
}

impl RetryPolicy for RetryableErrors {
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
        if !state.idempotent {
            return RetryResult::Permanent(error);
        }
        if self.is_transient(&error) {
            RetryResult::Continue(error)
        } else {
            RetryResult::Permanent(error)
        }
    }
}

/// A retry policy that treats every error as permanent.
///
/// Useful for requests that are never safe to repeat.
#[derive(Clone, Debug)]
pub struct NeverRetry;

impl RetryPolicy for NeverRetry {
    fn on_error(&self, _state: &RetryState, error: Error) -> RetryResult {
        RetryResult::Permanent(error)
    }
}

/// A retry policy decorator that limits the number of retries.
///
/// This policy decorates an inner policy and limits the total number of
/// retries. Once the limit is reached, transient errors become
/// [Exhausted][RetryResult::Exhausted]. Permanent errors are returned as-is.
///
/// # Parameters
/// * `P` - the inner retry policy.
#[derive(Clone, Debug)]
pub struct LimitedRetryCount<P>
where
    P: RetryPolicy,
{
    inner: P,
    maximum_retries: u32,
}

impl LimitedRetryCount<RetryableErrors> {
    /// Creates a new instance, with the default inner policy.
    pub fn new(maximum_retries: u32) -> Self {
        Self {
            inner: RetryableErrors::default(),
            maximum_retries,
        }
    }
}

impl<P> LimitedRetryCount<P>
where
    P: RetryPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_retries: u32) -> Self {
        Self {
            inner,
            maximum_retries,
        }
    }

    /// The maximum number of retries after the initial attempt.
    pub fn maximum_retries(&self) -> u32 {
        self.maximum_retries
    }
}

impl<P> RetryPolicy for LimitedRetryCount<P>
where
    P: RetryPolicy,
{
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
        match self.inner.on_error(state, error) {
            RetryResult::Continue(e) if state.attempt_count > self.maximum_retries => {
                RetryResult::Exhausted(e)
            }
            flow => flow,
        }
    }
}
