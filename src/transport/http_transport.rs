//! HTTP transport implementation using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};

use super::{ByteStream, HttpRequest, HttpResponse, HttpTransport, MultipartFile, RequestBody};
use crate::config::DocumentLibraryConfig;
use crate::errors::{DocumentLibraryError, DocumentLibraryResult};

/// Reqwest-based HTTP transport implementation.
///
/// The underlying client pools connections and is safe to share.
///
/// The configured timeout bounds the wait for the response headers only.
/// A streamed body is read at the caller's pace and can outlive it.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    header_timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Creates a transport configured from the client configuration.
    pub fn new(config: &DocumentLibraryConfig) -> DocumentLibraryResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| DocumentLibraryError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            header_timeout: Some(config.timeout),
        })
    }

    /// Creates a new transport with a custom client.
    ///
    /// Timeouts are whatever the client was built with.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            header_timeout: None,
        }
    }
}

fn multipart_form(file: MultipartFile) -> DocumentLibraryResult<Form> {
    let part = Part::stream(file.content)
        .file_name(file.file_name)
        .mime_str(&file.content_type)?;

    Ok(Form::new().part(file.field_name, part))
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> DocumentLibraryResult<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes),
            // reqwest sets the multipart content type, boundary included.
            RequestBody::Multipart(file) => builder.multipart(multipart_form(file)?),
        };

        let pending = builder.send();
        let response = match self.header_timeout {
            Some(limit) => tokio::time::timeout(limit, pending).await.map_err(|_| {
                DocumentLibraryError::Timeout {
                    message: format!("no response headers within {limit:?}"),
                }
            })??,
            None => pending.await?,
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(DocumentLibraryError::from));

        Ok(HttpResponse::new(status, headers, ByteStream::new(body)))
    }
}
