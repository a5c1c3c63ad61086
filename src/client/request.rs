//! Request construction from route templates.

use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderValue, ACCEPT};
use serde::Serialize;
use std::fmt::Display;
use url::Url;

use super::Operation;
use crate::errors::{DocumentLibraryError, DocumentLibraryResult};
use crate::transport::{HttpRequest, Method, MultipartFile, RequestBody};

/// Characters left as is inside a path segment.
const PATH_SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Builds an [`HttpRequest`] for one operation.
///
/// Route tokens such as `{libraryId}` are replaced by percent-encoded
/// values; query parameters whose value is `None` are left out entirely.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    accept_json: bool,
    body: RequestBody,
}

impl RequestBuilder {
    /// Starts a request for a method and route template.
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        Self {
            method,
            path: template.into(),
            query: Vec::new(),
            accept_json: false,
            body: RequestBody::Empty,
        }
    }

    /// Starts a request using the operation's method and route.
    pub fn for_operation(operation: Operation) -> Self {
        Self::new(operation.method(), operation.route())
    }

    /// Replaces `{token}` in the route with `value`.
    #[must_use]
    pub fn replace_token(mut self, token: &str, value: impl Display) -> Self {
        let encoded = utf8_percent_encode(&value.to_string(), PATH_SEGMENT_SET).to_string();
        self.path = self.path.replace(&format!("{{{token}}}"), &encoded);
        self
    }

    /// Appends a query parameter, or nothing when `value` is `None`.
    #[must_use]
    pub fn query(mut self, name: &str, value: Option<impl Display>) -> Self {
        if let Some(value) = value {
            self.query.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Asks for a JSON response.
    #[must_use]
    pub fn accept_json(mut self) -> Self {
        self.accept_json = true;
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> DocumentLibraryResult<Self> {
        self.body = RequestBody::Json(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// Sets a multipart body.
    #[must_use]
    pub fn multipart(mut self, file: MultipartFile) -> Self {
        self.body = RequestBody::Multipart(file);
        self
    }

    /// Resolves the route against `base_url` and produces the request.
    ///
    /// A token left in the route is a construction bug and is reported
    /// before anything is sent.
    pub fn build(self, base_url: &Url) -> DocumentLibraryResult<HttpRequest> {
        if let Some(start) = self.path.find('{') {
            let token = self.path[start..]
                .split_inclusive('}')
                .next()
                .unwrap_or(&self.path[start..]);
            return Err(DocumentLibraryError::Configuration {
                message: format!("Route '{}' has unresolved token {token}", self.path),
            });
        }

        let mut url = base_url.join(&self.path)?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }

        let mut request = HttpRequest::new(self.method, url);
        if self.accept_json {
            request
                .headers
                .insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        request.body = self.body;
        Ok(request)
    }
}
