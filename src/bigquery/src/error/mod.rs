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

mod core_error;
pub use core_error::*;

/// The error payloads returned by the BigQuery service.
///
/// BigQuery uses the "legacy" JSON error format: the response body contains an
/// `error` object with a list of `errors`, each one with a short
/// machine-readable `reason`.
///
/// # Example
/// ```
/// use google_cloud_bigquery::error::rpc::ErrorBody;
/// let payload = bytes::Bytes::from_static(
///     br#"{"error": {"code": 400, "errors": [{"reason": "backendError"}]}}"#);
/// let body = ErrorBody::try_from(&payload)?;
/// assert_eq!(body.reasons().collect::<Vec<_>>(), vec!["backendError"]);
/// # Ok::<(), google_cloud_bigquery::error::Error>(())
/// ```
pub mod rpc;
