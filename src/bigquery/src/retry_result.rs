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

//! Retry loop control types.

use crate::error::Error;

/// The result of a retry policy decision.
///
/// All variants carry the original error, unmodified. When the loop stops,
/// this is the error returned to the application.
///
/// # Example
///
/// ```
/// # use google_cloud_bigquery::error::Error;
/// # use google_cloud_bigquery::retry_policy::RetryPolicy;
/// # use google_cloud_bigquery::retry_result::RetryResult;
/// # use google_cloud_bigquery::retry_state::RetryState;
/// #[derive(Debug)]
/// struct MyRetryPolicy;
/// impl RetryPolicy for MyRetryPolicy {
///     fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
///         if state.attempt_count > 42 {
///             return RetryResult::Exhausted(error);
///         }
///         RetryResult::Continue(error)
///     }
/// }
/// ```
#[derive(Debug)]
pub enum RetryResult {
    /// The error is non-retryable, stop the loop.
    Permanent(Error),

    /// The error is retryable, but the policy is stopping the loop.
    ///
    /// Policies may stop the loop on retryable errors, for example, because
    /// the policy only allows a limited number of attempts.
    Exhausted(Error),

    /// The error was retryable, continue the loop.
    Continue(Error),
}

impl RetryResult {
    /// Returns true if the error is permanent.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    /// Returns true if the error is retryable but the loop must stop.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    /// Returns true if the loop should make another attempt.
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// The error carried by any variant.
    pub fn error(&self) -> &Error {
        match self {
            Self::Permanent(e) | Self::Exhausted(e) | Self::Continue(e) => e,
        }
    }

    /// Consumes the decision and returns the original error.
    ///
    /// The retry loop returns this error, unmodified, when it stops.
    pub fn into_error(self) -> Error {
        match self {
            Self::Permanent(e) | Self::Exhausted(e) | Self::Continue(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(RetryResult::Permanent(error(403)), true, false, false; "permanent")]
    #[test_case(RetryResult::Exhausted(error(503)), false, true, false; "exhausted")]
    #[test_case(RetryResult::Continue(error(500)), false, false, true; "continue")]
    fn predicates(flow: RetryResult, permanent: bool, exhausted: bool, cont: bool) {
        assert_eq!(flow.is_permanent(), permanent, "{flow:?}");
        assert_eq!(flow.is_exhausted(), exhausted, "{flow:?}");
        assert_eq!(flow.is_continue(), cont, "{flow:?}");
    }

    #[test_case(RetryResult::Permanent(error(403)), 403; "permanent")]
    #[test_case(RetryResult::Exhausted(error(503)), 503; "exhausted")]
    #[test_case(RetryResult::Continue(error(500)), 500; "continue")]
    fn carries_original_error(flow: RetryResult, want: u16) {
        assert_eq!(flow.error().http_status_code(), Some(want));
        let payload = flow.error().http_payload().cloned();
        let error = flow.into_error();
        assert_eq!(error.http_status_code(), Some(want));
        assert_eq!(error.http_payload().cloned(), payload);
    }

    fn error(status: u16) -> Error {
        Error::http(
            status,
            http::HeaderMap::new(),
            bytes::Bytes::from(format!("status={status}")),
        )
    }
}
