//! Request and response bodies of the item commands.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::items::default_content_type;
use super::path::CloudPath;

/// Body of an upsert-tags request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertFileTagsRequest {
    /// Tags to add or overwrite.
    pub tags: HashMap<String, String>,
}

impl UpsertFileTagsRequest {
    /// Creates a request from key/value pairs.
    pub fn new<K, V>(tags: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A file to import from an external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    /// Name to give the imported file.
    pub name: String,
    /// Identifier of the file in the external store.
    pub alternate_id: String,
    /// Size in bytes, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<i64>,
    /// MIME type of the content.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Destination directory, relative to the import root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_path: Option<CloudPath>,
    /// Whether to replace an existing file.
    #[serde(default)]
    pub overwrite: bool,
    /// Additional fields sent verbatim.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

impl ImportRecord {
    /// Creates a record for `name` backed by `alternate_id`.
    pub fn new(name: impl Into<String>, alternate_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alternate_id: alternate_id.into(),
            length: None,
            content_type: default_content_type(),
            import_path: None,
            overwrite: false,
            extension: Map::new(),
        }
    }

    /// Sets the length.
    #[must_use]
    pub fn length(mut self, length: i64) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Sets the destination directory.
    #[must_use]
    pub fn import_path(mut self, path: CloudPath) -> Self {
        self.import_path = Some(path);
        self
    }

    /// Replaces an existing file.
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Body of an import request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFilesRequest {
    /// Files to import.
    pub files: Vec<ImportRecord>,
}

/// Answer of the exists command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExistsResponse {
    /// Whether the item exists.
    pub exists: bool,
    /// Keys not mapped to a known field.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

/// Outcome of an anti-virus scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AntiVirusScanResult {
    /// Scanner verdict, e.g. `Clean`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Keys not mapped to a known field.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

/// A file to upload, sent as the `data` part of a multipart form.
///
/// The part is named after the last segment of `path`.
///
/// The content is held in memory as [`Bytes`], so an upload costs its full
/// size in RAM. In return the request can be cloned cheaply and a retry
/// policy can resend the same multipart body on every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Where the file is created.
    pub path: CloudPath,
    /// The file content.
    pub content: Bytes,
    /// MIME type of the content. Defaults to `application/octet-stream`.
    pub content_type: Option<String>,
    /// Replace an existing file at `path`.
    pub overwrite: bool,
}

impl FileUpload {
    /// Creates an upload that fails if the file exists.
    pub fn new(path: CloudPath, content: impl Into<Bytes>) -> Self {
        Self {
            path,
            content: content.into(),
            content_type: None,
            overwrite: false,
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets whether an existing file is replaced.
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Storage metadata of a file's content stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFileStream {
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Storage partition.
    pub partition_id: Uuid,
    /// The file this stream belongs to.
    pub file_id: Uuid,
    /// Creation time.
    pub created_on: DateTime<Utc>,
    /// Last access time.
    pub last_accessed_on: DateTime<Utc>,
    /// Last modification time.
    pub last_modified_on: DateTime<Utc>,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub length: i64,
    /// MIME type of the content.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Keys not mapped to a known field.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}
