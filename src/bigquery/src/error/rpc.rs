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

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// The `error` object in a BigQuery error response.
///
/// BigQuery returns errors in this shape:
///
/// ```norust
/// {
///   "error": {
///     "code": 400,
///     "message": "...",
///     "errors": [
///       { "reason": "backendError", "location": "...", "debugInfo": "...", "message": "..." }
///     ]
///   }
/// }
/// ```
///
/// More information in the [BigQuery troubleshooting guide].
///
/// [BigQuery troubleshooting guide]: https://cloud.google.com/bigquery/docs/error-messages
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ErrorBody {
    /// The HTTP status code repeated in the body.
    #[serde(deserialize_with = "lenient")]
    pub code: i32,

    /// A developer-facing error message.
    #[serde(deserialize_with = "lenient")]
    pub message: String,

    /// The string form of the canonical error code, if present.
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,

    /// The individual errors, each with its own `reason`.
    #[serde(deserialize_with = "lenient")]
    pub errors: Vec<ErrorDetail>,
}

impl ErrorBody {
    /// Sets the value for [message][ErrorBody::message].
    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }

    /// Sets the value for [errors][ErrorBody::errors].
    pub fn set_errors<T, I>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = I>,
        I: Into<ErrorDetail>,
    {
        self.errors = v.into_iter().map(|v| v.into()).collect();
        self
    }

    /// Returns the `reason` of each entry in [errors][ErrorBody::errors].
    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.reason.as_str())
    }
}

/// One entry in the `error.errors[]` list.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ErrorDetail {
    /// A short, machine-readable description of the error cause.
    #[serde(deserialize_with = "lenient")]
    pub reason: String,

    /// Where the error occurred, for example, a column name in a query.
    #[serde(deserialize_with = "lenient")]
    pub location: String,

    /// Debugging information, only useful to the BigQuery team.
    #[serde(deserialize_with = "lenient")]
    pub debug_info: String,

    /// A human-readable description of the error.
    #[serde(deserialize_with = "lenient")]
    pub message: String,
}

impl ErrorDetail {
    /// Sets the value for [reason][ErrorDetail::reason].
    pub fn set_reason<T: Into<String>>(mut self, v: T) -> Self {
        self.reason = v.into();
        self
    }

    /// Sets the value for [message][ErrorDetail::message].
    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }
}

// A field with `null` or an unexpected type takes its default value, so one
// malformed field does not hide the `reason` values.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

impl TryFrom<&bytes::Bytes> for ErrorBody {
    type Error = Error;

    fn try_from(value: &bytes::Bytes) -> Result<Self, Self::Error> {
        serde_json::from_slice::<ErrorWrapper>(value)
            .map(|w| w.error)
            .map_err(Error::deser)
    }
}

/// The canonical error codes for APIs.
///
/// BigQuery responds with HTTP status codes, [Code::from_http_status] maps
/// them to the canonical codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Code {
    /// HTTP Mapping: 499 Client Closed Request
    Cancelled,

    /// HTTP Mapping: any status code without a more specific mapping.
    #[default]
    Unknown,

    /// HTTP Mapping: 400 Bad Request
    InvalidArgument,

    /// HTTP Mapping: 504 Gateway Timeout
    DeadlineExceeded,

    /// HTTP Mapping: 404 Not Found
    NotFound,

    /// HTTP Mapping: 409 Conflict
    AlreadyExists,

    /// HTTP Mapping: 403 Forbidden
    PermissionDenied,

    /// HTTP Mapping: 429 Too Many Requests
    ResourceExhausted,

    /// HTTP Mapping: 412 Precondition Failed
    FailedPrecondition,

    /// HTTP Mapping: 501 Not Implemented
    Unimplemented,

    /// HTTP Mapping: 500 Internal Server Error
    Internal,

    /// The service is currently unavailable. This is most likely a transient
    /// condition, which can be corrected by retrying with a backoff.
    ///
    /// HTTP Mapping: 503 Service Unavailable
    Unavailable,

    /// HTTP Mapping: 401 Unauthorized
    Unauthenticated,
}

impl Code {
    /// Maps an HTTP status code to the canonical code.
    pub fn from_http_status(status_code: u16) -> Self {
        match status_code {
            400 => Code::InvalidArgument,
            401 => Code::Unauthenticated,
            403 => Code::PermissionDenied,
            404 => Code::NotFound,
            409 => Code::AlreadyExists,
            412 => Code::FailedPrecondition,
            429 => Code::ResourceExhausted,
            499 => Code::Cancelled,
            500 => Code::Internal,
            501 => Code::Unimplemented,
            503 => Code::Unavailable,
            504 => Code::DeadlineExceeded,
            _ => Code::Unknown,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Code::Cancelled => "CANCELLED",
            Code::Unknown => "UNKNOWN",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Code::NotFound => "NOT_FOUND",
            Code::AlreadyExists => "ALREADY_EXISTS",
            Code::PermissionDenied => "PERMISSION_DENIED",
            Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Unimplemented => "UNIMPLEMENTED",
            Code::Internal => "INTERNAL",
            Code::Unavailable => "UNAVAILABLE",
            Code::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    const SAMPLE_PAYLOAD: &[u8] = br#"{
        "error": {
          "code": 403,
          "message": "Exceeded rate limits: too many table update operations for this table.",
          "errors": [
            {
              "message": "Exceeded rate limits: too many table update operations for this table.",
              "domain": "usageLimits",
              "reason": "rateLimitExceeded"
            },
            {
              "message": "Error encountered during execution. Retrying may solve the problem.",
              "reason": "backendError",
              "location": "query",
              "debugInfo": "opaque"
            }
          ],
          "status": "PERMISSION_DENIED"
        }
    }"#;

    #[test]
    fn try_from_bytes() -> Result<()> {
        let got = ErrorBody::try_from(&bytes::Bytes::from_static(SAMPLE_PAYLOAD))?;
        assert_eq!(got.code, 403);
        assert_eq!(got.status.as_deref(), Some("PERMISSION_DENIED"));
        assert_eq!(
            got.reasons().collect::<Vec<_>>(),
            vec!["rateLimitExceeded", "backendError"]
        );
        assert_eq!(got.errors[1].location, "query");
        assert_eq!(got.errors[1].debug_info, "opaque");
        Ok(())
    }

    #[test_case(b"not json at all"; "not json")]
    #[test_case(b"{\"missing-error\": 1234}"; "missing error")]
    #[test_case(b"{\"error\": 1234}"; "error is not an object")]
    #[test_case(b""; "empty")]
    fn try_from_bytes_errors(input: &'static [u8]) {
        let got = ErrorBody::try_from(&bytes::Bytes::from_static(input));
        let err = got.unwrap_err();
        assert!(err.is_deserialization(), "{err:?}");
    }

    #[test]
    fn missing_fields_use_defaults() -> Result<()> {
        let got = ErrorBody::try_from(&bytes::Bytes::from_static(
            br#"{"error": {"errors": [{}]}}"#,
        ))?;
        assert_eq!(got.errors, vec![ErrorDetail::default()]);
        assert_eq!(got.reasons().collect::<Vec<_>>(), vec![""]);
        Ok(())
    }

    #[test_case(br#"{"error": {"code": 400, "message": null, "errors": [{"reason": "backendError"}]}}"#; "null message")]
    #[test_case(br#"{"error": {"code": 400, "errors": [{"reason": "backendError", "location": null, "message": null}]}}"#; "null detail fields")]
    #[test_case(br#"{"error": {"code": "400", "status": 7, "errors": [{"reason": "backendError", "debugInfo": {"k": "v"}}]}}"#; "unexpected types")]
    #[test_case(br#"{"error": {"code": null, "message": "m", "errors": [{"reason": "backendError", "location": 12}]}}"#; "null code")]
    fn malformed_fields_keep_reasons(input: &'static [u8]) -> Result<()> {
        let got = ErrorBody::try_from(&bytes::Bytes::from_static(input))?;
        assert_eq!(got.reasons().collect::<Vec<_>>(), vec!["backendError"]);
        assert_eq!(got.errors[0].location, "");
        Ok(())
    }

    #[test]
    fn null_errors_list() -> Result<()> {
        let got = ErrorBody::try_from(&bytes::Bytes::from_static(
            br#"{"error": {"code": 400, "message": "m", "errors": null}}"#,
        ))?;
        assert_eq!(got.code, 400);
        assert_eq!(got.message, "m");
        assert!(got.errors.is_empty(), "{got:?}");
        Ok(())
    }

    #[test]
    fn setters() {
        let body = ErrorBody::default().set_message("msg").set_errors([
            ErrorDetail::default().set_reason("backendError"),
            ErrorDetail::default()
                .set_reason("invalid")
                .set_message("bad field"),
        ]);
        assert_eq!(body.message, "msg");
        assert_eq!(
            body.reasons().collect::<Vec<_>>(),
            vec!["backendError", "invalid"]
        );
        assert_eq!(body.errors[1].message, "bad field");
    }

    #[test_case(400, Code::InvalidArgument)]
    #[test_case(401, Code::Unauthenticated)]
    #[test_case(403, Code::PermissionDenied)]
    #[test_case(404, Code::NotFound)]
    #[test_case(409, Code::AlreadyExists)]
    #[test_case(412, Code::FailedPrecondition)]
    #[test_case(429, Code::ResourceExhausted)]
    #[test_case(499, Code::Cancelled)]
    #[test_case(500, Code::Internal)]
    #[test_case(501, Code::Unimplemented)]
    #[test_case(503, Code::Unavailable)]
    #[test_case(504, Code::DeadlineExceeded)]
    #[test_case(418, Code::Unknown)]
    #[test_case(502, Code::Unknown)]
    fn from_http_status(status: u16, want: Code) {
        assert_eq!(Code::from_http_status(status), want);
    }

    #[test]
    fn display() {
        assert_eq!(Code::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(Code::default().to_string(), "UNKNOWN");
    }
}
