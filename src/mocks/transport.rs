//! Mock transport for testing.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::errors::{DocumentLibraryError, DocumentLibraryResult};
use crate::transport::{ByteStream, HttpRequest, HttpResponse, HttpTransport};

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Bytes,
}

impl MockResponse {
    /// A response with the given status and no body.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// A JSON response.
    pub fn json(status: u16, body: impl Into<Bytes>) -> Self {
        Self::empty(status)
            .header(CONTENT_TYPE.as_str(), "application/json")
            .body(body)
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    fn into_response(self) -> DocumentLibraryResult<HttpResponse> {
        let status = StatusCode::from_u16(self.status).map_err(|_| DocumentLibraryError::Transport {
            message: format!("Invalid mock status {}", self.status),
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes());
            let value = HeaderValue::from_str(value);
            if let (Ok(name), Ok(value)) = (name, value) {
                headers.append(name, value);
            }
        }

        Ok(HttpResponse::new(status, headers, ByteStream::from_bytes(self.body)))
    }
}

#[derive(Debug)]
enum Scripted {
    Response(MockResponse),
    Fault(DocumentLibraryError),
}

/// Transport that answers from a queue and records every request.
///
/// When the queue runs dry the transport fails with a
/// [`DocumentLibraryError::Transport`] fault.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Creates a transport with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits this long before answering each request.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queues a response.
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.script).push_back(Scripted::Response(response));
    }

    /// Queues a fault, such as a timeout or connection failure.
    pub fn push_fault(&self, fault: DocumentLibraryError) {
        lock(&self.script).push_back(Scripted::Fault(fault));
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> DocumentLibraryResult<HttpResponse> {
        lock(&self.requests).push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = lock(&self.script).pop_front();
        match next {
            Some(Scripted::Response(response)) => response.into_response(),
            Some(Scripted::Fault(fault)) => Err(fault),
            None => Err(DocumentLibraryError::Transport {
                message: "No mock response queued".to_string(),
            }),
        }
    }
}
