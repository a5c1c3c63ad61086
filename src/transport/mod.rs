//! HTTP transport module for the Document Library client.
//!
//! A transport sends one [`HttpRequest`] and returns as soon as the status
//! line and headers are available. The body stays on the wire inside a
//! [`ByteStream`] until someone reads it, so downloads are never buffered
//! by this layer.

mod http_transport;

pub use http_transport::ReqwestTransport;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use url::Url;

use crate::errors::DocumentLibraryResult;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl Method {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A single file sent as a multipart form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFile {
    /// Form field name.
    pub field_name: String,
    /// File name reported in the part's content disposition.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// The file content.
    pub content: Bytes,
}

/// Request body variants.
///
/// Bodies are cheap to clone so a policy can replay a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Encoded JSON.
    Json(Bytes),
    /// A multipart form with one file.
    Multipart(MultipartFile),
}

/// A fully built HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL, including the query string.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: RequestBody,
}

impl HttpRequest {
    /// Creates a request without headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Returns the first value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

pin_project! {
    /// Streaming response body.
    pub struct ByteStream {
        #[pin]
        inner: Pin<Box<dyn Stream<Item = DocumentLibraryResult<Bytes>> + Send>>,
    }
}

impl ByteStream {
    /// Wraps a stream of chunks.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = DocumentLibraryResult<Bytes>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// A body consisting of a single chunk.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::new(futures::stream::once(async move { Ok(bytes) }))
    }

    /// An empty body.
    pub fn empty() -> Self {
        Self::new(futures::stream::empty())
    }

    /// Reads the remaining chunks into one buffer.
    pub async fn collect_bytes(mut self) -> DocumentLibraryResult<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }
}

impl Stream for ByteStream {
    type Item = DocumentLibraryResult<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ByteStream")
    }
}

/// HTTP response whose body has not been read yet.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    body: ByteStream,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: ByteStream) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The canonical reason phrase for the status code, not the text the
    /// server put on its status line. `None` for unregistered codes.
    pub fn reason_phrase(&self) -> Option<&'static str> {
        self.status.canonical_reason()
    }

    /// The `Content-Type` header, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Takes the body stream.
    pub fn into_body(self) -> ByteStream {
        self.body
    }

    /// Splits the response into its parts.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, ByteStream) {
        (self.status, self.headers, self.body)
    }

    /// Reads the whole body.
    pub async fn bytes(self) -> DocumentLibraryResult<Bytes> {
        self.body.collect_bytes().await
    }
}

/// Trait for HTTP transport implementations.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request, returning once the response headers are read.
    async fn send(&self, request: HttpRequest) -> DocumentLibraryResult<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_conversion() {
        assert_eq!(reqwest::Method::from(Method::Get), reqwest::Method::GET);
        assert_eq!(reqwest::Method::from(Method::Post), reqwest::Method::POST);
        assert_eq!(Method::Post.to_string(), "POST");
    }

    #[test]
    fn test_query_param_lookup() {
        let url = Url::parse("http://localhost/libraries?tenantId=abc&api-version=2019-09-01").unwrap();
        let request = HttpRequest::new(Method::Get, url);

        assert_eq!(request.query_param("tenantId").as_deref(), Some("abc"));
        assert_eq!(request.query_param("missing"), None);
    }

    #[tokio::test]
    async fn test_byte_stream_collects_chunks() {
        let stream = ByteStream::new(futures::stream::iter(vec![
            Ok(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ]));

        assert_eq!(stream.collect_bytes().await.unwrap(), Bytes::from_static(b"hello world"));
    }

    #[tokio::test]
    async fn test_response_reason_phrase() {
        let response = HttpResponse::new(StatusCode::IM_A_TEAPOT, HeaderMap::new(), ByteStream::empty());
        assert_eq!(response.reason_phrase(), Some("I'm a teapot"));
        assert!(response.bytes().await.unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_status_has_no_reason_phrase() {
        let status = StatusCode::from_u16(599).unwrap();
        let response = HttpResponse::new(status, HeaderMap::new(), ByteStream::empty());
        assert_eq!(response.reason_phrase(), None);
    }
}
