//! Turns raw responses into [`ApiResult`]s.
//!
//! Status handling is the same for every operation:
//!
//! | Status      | Outcome                                              |
//! |-------------|------------------------------------------------------|
//! | 200         | body decoded into the operation's value               |
//! | 204         | [`ApiResult::NoContent`]                              |
//! | 400, 500    | body decoded as an error envelope                     |
//! | anything else | [`UnexpectedStatusCodeError`] with the raw body     |
//!
//! Download error bodies may also be problem documents.

use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{ApiResult, FileResponse};
use crate::client::Operation;
use crate::errors::{
    ApiError, DocumentLibraryError, DocumentLibraryResult, ErrorResponse, HttpProblem,
    UnexpectedStatusCodeError, PROBLEM_JSON,
};
use crate::transport::HttpResponse;

/// Reads the whole body unless the caller cancels first.
pub(crate) async fn read_body(
    response: HttpResponse,
    cancellation: &CancellationToken,
) -> DocumentLibraryResult<Bytes> {
    tokio::select! {
        biased;
        () = cancellation.cancelled() => Err(DocumentLibraryError::Cancelled),
        body = response.bytes() => body,
    }
}

/// Decodes a JSON payload, keeping the raw body on failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> DocumentLibraryResult<T> {
    serde_json::from_slice(body).map_err(|e| DocumentLibraryError::Deserialization {
        message: e.to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

/// Interprets a response whose success payload is JSON.
pub(crate) async fn json<T: DeserializeOwned>(
    operation: Operation,
    response: HttpResponse,
    cancellation: &CancellationToken,
) -> DocumentLibraryResult<ApiResult<T>> {
    match response.status {
        StatusCode::OK => {
            let body = read_body(response, cancellation).await?;
            decode(&body).map(ApiResult::Success)
        }
        _ => non_success(operation, response, cancellation, false).await,
    }
}

/// Interprets a response that carries no success payload.
pub(crate) async fn unit(
    operation: Operation,
    response: HttpResponse,
    cancellation: &CancellationToken,
) -> DocumentLibraryResult<ApiResult<()>> {
    match response.status {
        StatusCode::OK => Ok(ApiResult::Success(())),
        _ => non_success(operation, response, cancellation, false).await,
    }
}

/// Interprets a download response, leaving a successful body unread.
pub(crate) async fn download(
    operation: Operation,
    response: HttpResponse,
    cancellation: &CancellationToken,
) -> DocumentLibraryResult<ApiResult<FileResponse>> {
    match response.status {
        StatusCode::OK => Ok(ApiResult::Success(FileResponse::new(response))),
        _ => non_success(operation, response, cancellation, true).await,
    }
}

async fn non_success<T>(
    operation: Operation,
    response: HttpResponse,
    cancellation: &CancellationToken,
    problem_aware: bool,
) -> DocumentLibraryResult<ApiResult<T>> {
    match response.status {
        StatusCode::NO_CONTENT => Ok(ApiResult::NoContent),
        StatusCode::BAD_REQUEST | StatusCode::INTERNAL_SERVER_ERROR => {
            documented_error(operation, response, cancellation, problem_aware)
                .await
                .map(ApiResult::Failure)
        }
        _ => unexpected_status(operation, response, cancellation)
            .await
            .map(ApiResult::Failure),
    }
}

async fn documented_error(
    operation: Operation,
    response: HttpResponse,
    cancellation: &CancellationToken,
    problem_aware: bool,
) -> DocumentLibraryResult<ApiError> {
    let status = response.status.as_u16();
    let reason = response.reason_phrase().map(str::to_string);
    let is_problem = problem_aware
        && response
            .content_type()
            .is_some_and(|content_type| content_type.starts_with(PROBLEM_JSON));

    let body = read_body(response, cancellation).await?;

    let decoded = if is_problem {
        serde_json::from_slice::<HttpProblem>(&body).map(ApiError::Problem)
    } else {
        serde_json::from_slice::<ErrorResponse>(&body)
            .map(|envelope| ApiError::Domain(envelope.error))
            .or_else(|e| match problem_aware.then(|| problem(&body)).flatten() {
                Some(problem) => Ok(ApiError::Problem(problem)),
                None => Err(e),
            })
    };

    match decoded {
        Ok(error) => {
            debug!(operation = operation.name(), status, code = error.code(), "Service reported an error");
            Ok(error)
        }
        Err(e) => {
            warn!(
                operation = operation.name(),
                status,
                error = %e,
                "Error body could not be decoded"
            );
            Ok(ApiError::UnexpectedStatus(UnexpectedStatusCodeError::new(
                status,
                reason,
                content(&body),
                operation.target(),
            )))
        }
    }
}

async fn unexpected_status(
    operation: Operation,
    response: HttpResponse,
    cancellation: &CancellationToken,
) -> DocumentLibraryResult<ApiError> {
    let status = response.status.as_u16();
    let reason = response.reason_phrase().map(str::to_string);

    let body = match read_body(response, cancellation).await {
        Ok(body) => Some(body),
        Err(DocumentLibraryError::Cancelled) => return Err(DocumentLibraryError::Cancelled),
        Err(e) => {
            debug!(operation = operation.name(), error = %e, "Could not read unexpected response body");
            None
        }
    };

    warn!(operation = operation.name(), status, "Unexpected status code");

    Ok(ApiError::UnexpectedStatus(UnexpectedStatusCodeError::new(
        status,
        reason,
        body.as_deref().and_then(content),
        operation.target(),
    )))
}

/// A problem document served without its content type. Every member is
/// optional, so an object only counts when it names a title or status.
fn problem(body: &[u8]) -> Option<HttpProblem> {
    serde_json::from_slice::<HttpProblem>(body)
        .ok()
        .filter(|problem| problem.title.is_some() || problem.status.is_some())
}

fn content(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(body).into_owned())
    }
}
