//! Streaming file download.

use bytes::Bytes;
use mime::Mime;
use percent_encoding::percent_decode_str;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::errors::DocumentLibraryResult;
use crate::transport::{ByteStream, HttpResponse};

/// A successful download whose content has not been read yet.
///
/// The connection stays open until the stream is consumed or the value is
/// dropped.
#[derive(Debug)]
pub struct FileResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ByteStream,
}

impl FileResponse {
    pub(crate) fn new(response: HttpResponse) -> Self {
        let (status, headers, body) = response.into_parts();
        Self {
            status,
            headers,
            body,
        }
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// All response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The parsed `Content-Type`, if present and valid.
    pub fn content_type(&self) -> Option<Mime> {
        self.header(CONTENT_TYPE.as_str())?.parse().ok()
    }

    /// The `Content-Length`, if the server sent one.
    pub fn content_length(&self) -> Option<u64> {
        self.header(CONTENT_LENGTH.as_str())?.trim().parse().ok()
    }

    /// The raw `Content-Disposition` header.
    pub fn content_disposition(&self) -> Option<&str> {
        self.header(CONTENT_DISPOSITION.as_str())
    }

    /// The file name from `Content-Disposition`, preferring the extended
    /// `filename*` form.
    pub fn file_name(&self) -> Option<String> {
        parse_file_name(self.content_disposition()?)
    }

    /// Takes the content stream.
    pub fn into_stream(self) -> ByteStream {
        self.body
    }

    /// Reads the whole content into memory.
    pub async fn bytes(self) -> DocumentLibraryResult<Bytes> {
        self.body.collect_bytes().await
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

fn parse_file_name(disposition: &str) -> Option<String> {
    let mut plain = None;

    for param in disposition.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        if key == "filename*" {
            // charset'language'percent-encoded
            let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
            if let Ok(decoded) = percent_decode_str(encoded).decode_utf8() {
                return Some(decoded.into_owned());
            }
        } else if key == "filename" {
            plain = Some(value.trim_matches('"').to_string());
        }
    }

    plain.filter(|name| !name.is_empty())
}
