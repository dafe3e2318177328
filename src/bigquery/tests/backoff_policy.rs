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

//! Verify backoff policies are usable from outside the crate.

#[cfg(test)]
mod tests {
    use google_cloud_bigquery::backoff_policy::*;
    use google_cloud_bigquery::retry_state::RetryState;
    use std::time::Duration;

    #[derive(Debug)]
    struct ConstantBackoff(Duration);
    impl BackoffPolicy for ConstantBackoff {
        fn on_failure(&self, _state: &RetryState) -> Duration {
            self.0
        }
    }

    #[test]
    fn create_truncated_exponential() -> anyhow::Result<()> {
        let _policy = TruncatedExponential::default();
        let policy = TruncatedExponentialBuilder::new()
            .with_initial_delay(Duration::from_secs(2))
            .with_maximum_delay(Duration::from_secs(60))
            .with_scaling(4.0)
            .build()?;
        let got: Vec<_> = (0..5).map(|n| policy.delay(n).as_secs()).collect();
        assert_eq!(got, vec![2, 8, 32, 60, 60]);
        Ok(())
    }

    #[test]
    fn custom_backoff() {
        let policy = ConstantBackoff(Duration::from_millis(100));
        let state = RetryState::new(true).set_attempt_count(7_u32);
        assert_eq!(policy.on_failure(&state), Duration::from_millis(100));
        let _arg = BackoffPolicyArg::from(policy);
    }
}
