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

//! Retry and backoff helpers for the BigQuery client library.
//!
//! Every call the BigQuery client makes to the service goes through a
//! [RetryExecutor][executor::RetryExecutor]. The executor runs one attempt of
//! the RPC, inspects any failure, and either returns the failure to the caller
//! or waits and tries again.
//!
//! BigQuery reports transient conditions in two ways: as `5xx` responses, and
//! as `4xx` responses where every entry in `error.errors[]` carries a
//! retryable `reason`, such as `backendError` or `rateLimitExceeded`. The
//! [RetryableErrors][retry_policy::RetryableErrors] policy encodes these rules.
//!
//! # Example
//! ```
//! # use google_cloud_bigquery::*;
//! use executor::RetryExecutor;
//! use options::ClientConfig;
//!
//! let executor = RetryExecutor::new(ClientConfig::default().set_retries(3_u32));
//! let dataset = executor.execute(|| Ok::<_, error::Error>("my_dataset"))?;
//! assert_eq!(dataset, "my_dataset");
//! # Ok::<(), error::Error>(())
//! ```

/// An alias of [std::result::Result] where the error is always [Error][crate::error::Error].
///
/// This is the result type used by all functions wrapping RPCs.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// The error types returned by RPC attempts.
pub mod error;

pub mod backoff_policy;
pub mod executor;
pub mod options;
pub mod retry_loop;
pub mod retry_policy;
pub mod retry_result;
pub mod retry_state;
