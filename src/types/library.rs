//! Library types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::path::CloudPath;

/// A named root collection of files and directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    /// Library identifier.
    pub library_id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Display name.
    pub name: String,
    /// Storage location of the library root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<CloudPath>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    /// Whether the library is indexed for search.
    #[serde(default)]
    pub is_search_enabled: bool,
    /// Keys not mapped to a known field.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

/// Body of a create-library request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLibraryRequest {
    /// Display name.
    pub name: String,
    /// Storage location of the library root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<CloudPath>,
    /// Whether to index the library for search.
    #[serde(default)]
    pub enable_search: bool,
    /// Additional fields sent verbatim.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

impl CreateLibraryRequest {
    /// Creates a request for a library with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            enable_search: false,
            extension: Map::new(),
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn location(mut self, location: CloudPath) -> Self {
        self.location = Some(location);
        self
    }

    /// Enables search indexing.
    #[must_use]
    pub fn enable_search(mut self, enable: bool) -> Self {
        self.enable_search = enable;
        self
    }

    /// Adds a field that has no typed counterpart.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extension.insert(key.into(), value);
        self
    }
}
