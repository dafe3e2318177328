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

//! Verify retry policies are usable from outside the crate.

#[cfg(test)]
mod tests {
    use google_cloud_bigquery::error::Error;
    use google_cloud_bigquery::retry_policy::*;
    use google_cloud_bigquery::retry_result::RetryResult;
    use google_cloud_bigquery::retry_state::RetryState;

    #[derive(Debug)]
    struct CustomRetryPolicy;
    impl RetryPolicy for CustomRetryPolicy {
        fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
            if state.idempotent {
                RetryResult::Continue(error)
            } else {
                RetryResult::Permanent(error)
            }
        }
    }

    #[test]
    fn create_limited_retry_count() {
        let _policy = LimitedRetryCount::custom(CustomRetryPolicy, 3);
        let _policy = LimitedRetryCount::new(3);
        let _policy = CustomRetryPolicy.with_retry_limit(3);
        let policy = bigquery_default();
        assert_eq!(policy.maximum_retries(), DEFAULT_RETRIES);
    }

    #[test]
    fn custom_policy_with_limit() {
        let policy = CustomRetryPolicy.with_retry_limit(2);
        let error = || Error::io("test-only");
        let state = RetryState::new(true).set_attempt_count(2_u32);
        assert!(policy.on_error(&state, error()).is_continue());
        let state = RetryState::new(true).set_attempt_count(3_u32);
        assert!(policy.on_error(&state, error()).is_exhausted());
        let state = RetryState::new(false).set_attempt_count(1_u32);
        assert!(policy.on_error(&state, error()).is_permanent());
    }

    #[test]
    fn retryable_reasons() {
        let reasons = RetryableReasons::default();
        for r in DEFAULT_RETRYABLE_REASONS {
            assert!(reasons.contains(r), "{r}");
        }
        let reasons = reasons.with_reason("jobInternalError");
        assert!(reasons.all_retryable(["jobInternalError", "backendError"]));
        assert!(!reasons.all_retryable(["jobInternalError", "invalid"]));
        assert!(!reasons.all_retryable(Vec::<&str>::new()));
    }
}
