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

//! Defines the trait for backoff policies and the BigQuery implementation.
//!
//! The BigQuery [SLA] requires clients to wait before retrying failed
//! requests, doubling the wait on each consecutive failure, up to a maximum of
//! 32 seconds. [TruncatedExponential] implements this schedule. Its default
//! configuration produces 1s, 2s, 4s, 8s, 16s, and then 32s for every later
//! retry.
//!
//! # Example
//! ```
//! # use google_cloud_bigquery::backoff_policy::*;
//! use std::time::Duration;
//!
//! let policy = TruncatedExponentialBuilder::new()
//!     .with_initial_delay(Duration::from_millis(500))
//!     .with_maximum_delay(Duration::from_secs(8))
//!     .build()?;
//! assert_eq!(policy.delay(1), Duration::from_secs(1));
//! assert_eq!(policy.delay(10), Duration::from_secs(8));
//! # Ok::<(), Error>(())
//! ```
//!
//! [SLA]: https://cloud.google.com/bigquery/sla

use crate::retry_state::RetryState;
use std::sync::Arc;
use std::time::Duration;

/// Defines the trait implemented by all backoff strategies.
pub trait BackoffPolicy: Send + Sync + std::fmt::Debug {
    /// Returns the backoff delay on a failure.
    ///
    /// # Parameters
    /// * `state` - the state of the retry loop. This method is always called
    ///   after at least one attempt, use [RetryState::retry_index] to find
    ///   which retry the delay precedes.
    fn on_failure(&self, state: &RetryState) -> Duration;
}

/// A helper type to use [BackoffPolicy] in client and request options.
#[derive(Clone, Debug)]
pub struct BackoffPolicyArg(pub(crate) Arc<dyn BackoffPolicy>);

impl<T: BackoffPolicy + 'static> std::convert::From<T> for BackoffPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn BackoffPolicy>> for BackoffPolicyArg {
    fn from(value: Arc<dyn BackoffPolicy>) -> Self {
        Self(value)
    }
}

impl From<BackoffPolicyArg> for Arc<dyn BackoffPolicy> {
    fn from(value: BackoffPolicyArg) -> Arc<dyn BackoffPolicy> {
        value.0
    }
}

/// The error type for truncated exponential backoff creation.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("the scaling value ({0}) should be >= 1.0")]
    InvalidScalingFactor(f64),
    #[error("the initial delay ({0:?}) should be greater than zero")]
    InvalidInitialDelay(Duration),
    #[error(
        "the maximum delay ({maximum:?}) should be greater than or equal to the initial delay ({initial:?})"
    )]
    EmptyRange {
        maximum: Duration,
        initial: Duration,
    },
}

/// Builds a [TruncatedExponential] policy.
#[derive(Clone, Debug)]
pub struct TruncatedExponentialBuilder {
    initial_delay: Duration,
    maximum_delay: Duration,
    scaling: f64,
}

impl TruncatedExponentialBuilder {
    /// Creates a builder with the BigQuery recommended parameters.
    pub fn new() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            maximum_delay: DEFAULT_MAXIMUM_DELAY,
            scaling: DEFAULT_SCALING,
        }
    }

    /// Change the delay before the first retry.
    pub fn with_initial_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.initial_delay = v.into();
        self
    }

    /// Change the upper bound for any delay.
    pub fn with_maximum_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.maximum_delay = v.into();
        self
    }

    /// Change the scaling factor in this backoff policy.
    pub fn with_scaling<V: Into<f64>>(mut self, v: V) -> Self {
        self.scaling = v.into();
        self
    }

    /// Creates a new truncated exponential backoff policy.
    pub fn build(self) -> Result<TruncatedExponential, Error> {
        if self.scaling < 1.0 {
            return Err(Error::InvalidScalingFactor(self.scaling));
        }
        if self.initial_delay.is_zero() {
            return Err(Error::InvalidInitialDelay(self.initial_delay));
        }
        if self.maximum_delay < self.initial_delay {
            return Err(Error::EmptyRange {
                maximum: self.maximum_delay,
                initial: self.initial_delay,
            });
        }
        Ok(TruncatedExponential {
            initial_delay: self.initial_delay,
            maximum_delay: self.maximum_delay,
            scaling: self.scaling,
        })
    }
}

impl Default for TruncatedExponentialBuilder {
    fn default() -> Self {
        Self::new()
    }
}

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAXIMUM_DELAY: Duration = Duration::from_secs(32);
const DEFAULT_SCALING: f64 = 2.0;

/// Implements truncated exponential backoff without jitter.
///
/// The delay before retry `n` (0-based) is
/// `min(initial_delay * scaling^n, maximum_delay)`. The policy holds no
/// mutable state, the same index always produces the same delay.
#[derive(Clone, Debug, PartialEq)]
pub struct TruncatedExponential {
    initial_delay: Duration,
    maximum_delay: Duration,
    scaling: f64,
}

impl TruncatedExponential {
    /// Returns the delay before the retry with the given 0-based index.
    ///
    /// # Example
    /// ```
    /// # use google_cloud_bigquery::backoff_policy::TruncatedExponential;
    /// use std::time::Duration;
    /// let policy = TruncatedExponential::default();
    /// assert_eq!(policy.delay(0), Duration::from_secs(1));
    /// assert_eq!(policy.delay(4), Duration::from_secs(16));
    /// assert_eq!(policy.delay(9), Duration::from_secs(32));
    /// ```
    pub fn delay(&self, retry_index: u32) -> Duration {
        let exp = std::cmp::min(i32::MAX as u32, retry_index) as i32;
        let scaling = self.scaling.powi(exp);
        if scaling >= self.maximum_delay.div_duration_f64(self.initial_delay) {
            self.maximum_delay
        } else {
            // Cannot panic: scaling >= 1.0 and initial_delay * scaling < maximum_delay.
            self.initial_delay.mul_f64(scaling)
        }
    }
}

impl Default for TruncatedExponential {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            maximum_delay: DEFAULT_MAXIMUM_DELAY,
            scaling: DEFAULT_SCALING,
        }
    }
}

impl BackoffPolicy for TruncatedExponential {
    fn on_failure(&self, state: &RetryState) -> Duration {
        self.delay(state.retry_index())
    }
}
