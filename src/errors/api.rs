//! Structured errors reported by the Document Library API.
//!
//! These are values, not faults: the Result layer hands them back inside
//! [`ApiResult::Failure`](crate::services::ApiResult::Failure) and only the
//! façade turns them into a raised [`DocumentLibraryError::Api`](super::DocumentLibraryError::Api).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Error code used for [`UnexpectedStatusCodeError`].
pub const UNEXPECTED_STATUS_CODE: &str = "UnexpectedStatusCode";

/// Error code used when a problem document is surfaced as an [`ApiError`].
pub const HTTP_PROBLEM_CODE: &str = "HttpProblem";

/// Media type of RFC 7807 problem documents.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// The `{ "error": { ... } }` envelope returned on 400 and 500.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The reported error.
    pub error: ErrorDetail,
}

/// A domain error as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Machine readable error code.
    pub code: String,
    /// Human readable description.
    pub message: String,
    /// The element the error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Nested errors that contributed to this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
    /// More specific error information, chained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_error: Option<InnerError>,
    /// Fields not mapped above.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

impl ErrorDetail {
    /// Creates an error with the given code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            target: None,
            details: Vec::new(),
            inner_error: None,
            extension: Map::new(),
        }
    }

    /// Sets the target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// A chain of increasingly specific error codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerError {
    /// Specific error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// The next, more specific, error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_error: Option<Box<InnerError>>,
    /// Fields not mapped above.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

impl InnerError {
    /// Iterates the codes of this error and every error it wraps.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.inner_error.as_deref();
            Some(current)
        })
        .filter_map(|inner| inner.code.as_deref())
    }
}

/// An RFC 7807 problem document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HttpProblem {
    /// URI identifying the problem type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// HTTP status code generated by the origin server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Explanation specific to this occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// URI identifying this occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Problem type extension members.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// A response whose status code is outside the documented set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnexpectedStatusCodeError {
    /// Always [`UNEXPECTED_STATUS_CODE`].
    pub code: String,
    /// Describes the status code that was received.
    pub message: String,
    /// The operation that received the response.
    pub target: String,
    /// The raw response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// The canonical reason phrase for the status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_phrase: Option<String>,
    /// The numeric status code.
    pub status_code: u16,
}

impl UnexpectedStatusCodeError {
    /// Creates the error for a response received by `target`.
    pub fn new(
        status_code: u16,
        reason_phrase: Option<String>,
        content: Option<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            code: UNEXPECTED_STATUS_CODE.to_string(),
            message: format!(
                "The HTTP status code of the response was not expected ({status_code})."
            ),
            target: target.into(),
            content,
            reason_phrase,
            status_code,
        }
    }
}

/// Any error the API can report through a Result.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Decoded from an [`ErrorResponse`] envelope.
    Domain(ErrorDetail),
    /// Decoded from a problem document on a download endpoint.
    Problem(HttpProblem),
    /// The status code was not one the operation documents.
    UnexpectedStatus(UnexpectedStatusCodeError),
}

#[derive(Serialize)]
struct ProblemError<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
    problem: &'a HttpProblem,
}

impl ApiError {
    /// The error code.
    pub fn code(&self) -> &str {
        match self {
            ApiError::Domain(detail) => &detail.code,
            ApiError::Problem(_) => HTTP_PROBLEM_CODE,
            ApiError::UnexpectedStatus(err) => &err.code,
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Domain(detail) => &detail.message,
            ApiError::Problem(problem) => problem
                .detail
                .as_deref()
                .or(problem.title.as_deref())
                .unwrap_or("The server returned a problem document."),
            ApiError::UnexpectedStatus(err) => &err.message,
        }
    }

    /// The element or operation the error refers to.
    pub fn target(&self) -> Option<&str> {
        match self {
            ApiError::Domain(detail) => detail.target.as_deref(),
            ApiError::Problem(problem) => problem.instance.as_deref(),
            ApiError::UnexpectedStatus(err) => Some(&err.target),
        }
    }

    /// The HTTP status code, when the error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Domain(_) => None,
            ApiError::Problem(problem) => problem.status,
            ApiError::UnexpectedStatus(err) => Some(err.status_code),
        }
    }

    /// Serializes the error into its JSON wire shape.
    pub fn to_json(&self) -> String {
        let encoded = match self {
            ApiError::Domain(detail) => serde_json::to_string(detail),
            ApiError::Problem(problem) => serde_json::to_string(&ProblemError {
                code: self.code(),
                message: self.message(),
                target: self.target(),
                problem,
            }),
            ApiError::UnexpectedStatus(err) => serde_json::to_string(err),
        };

        encoded.unwrap_or_else(|_| {
            format!(
                r#"{{"code":{:?},"message":{:?}}}"#,
                self.code(),
                self.message()
            )
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())?;
        if let Some(target) = self.target() {
            write!(f, " (target: {target})")?;
        }
        Ok(())
    }
}

impl From<ErrorDetail> for ApiError {
    fn from(detail: ErrorDetail) -> Self {
        ApiError::Domain(detail)
    }
}

impl From<HttpProblem> for ApiError {
    fn from(problem: HttpProblem) -> Self {
        ApiError::Problem(problem)
    }
}

impl From<UnexpectedStatusCodeError> for ApiError {
    fn from(err: UnexpectedStatusCodeError) -> Self {
        ApiError::UnexpectedStatus(err)
    }
}
