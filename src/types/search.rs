//! Search requests and results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::path::CloudPath;

/// Structured search that renders to query and filter strings.
///
/// Query clauses are joined with `AND`, filter clauses with `and`. Blank
/// inputs contribute nothing. A filter alone is sent with an empty query,
/// and a request with neither is not sent at all.
///
/// ```
/// use integrations_document_library::SearchRequest;
///
/// let request = SearchRequest::new()
///     .name_query("invoice")
///     .item_type("file")
///     .required_tag("status", "paid");
///
/// assert_eq!(request.to_query().as_deref(), Some("name:('invoice')"));
/// assert_eq!(
///     request.to_filter().as_deref(),
///     Some("type eq 'file' and tags/any(tag: tag/key eq 'status' and tag/value eq 'paid')"),
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// Matches item names.
    pub name_query: Option<String>,
    /// Matches item paths.
    pub path_query: Option<String>,
    /// Restricts the item type, e.g. `file`.
    pub item_type: Option<String>,
    /// Tags that must be present with the given value.
    pub required_tags: BTreeMap<String, String>,
    /// Appended to the query verbatim.
    pub raw_query: Option<String>,
    /// Appended to the filter verbatim.
    pub raw_filter: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

fn join(clauses: Vec<String>, separator: &str) -> Option<String> {
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(separator))
    }
}

impl SearchRequest {
    /// Creates an empty search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name query.
    #[must_use]
    pub fn name_query(mut self, query: impl Into<String>) -> Self {
        self.name_query = Some(query.into());
        self
    }

    /// Sets the path query.
    #[must_use]
    pub fn path_query(mut self, query: impl Into<String>) -> Self {
        self.path_query = Some(query.into());
        self
    }

    /// Sets the item type filter.
    #[must_use]
    pub fn item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    /// Requires a tag with the given value.
    #[must_use]
    pub fn required_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_tags.insert(key.into(), value.into());
        self
    }

    /// Sets the raw query.
    #[must_use]
    pub fn raw_query(mut self, query: impl Into<String>) -> Self {
        self.raw_query = Some(query.into());
        self
    }

    /// Sets the raw filter.
    #[must_use]
    pub fn raw_filter(mut self, filter: impl Into<String>) -> Self {
        self.raw_filter = Some(filter.into());
        self
    }

    /// Renders the query string.
    pub fn to_query(&self) -> Option<String> {
        let mut clauses = Vec::new();

        if let Some(name) = present(self.name_query.as_ref()) {
            clauses.push(format!("name:('{name}')"));
        }
        if let Some(path) = present(self.path_query.as_ref()) {
            clauses.push(format!("path:('{path}')"));
        }
        if let Some(raw) = present(self.raw_query.as_ref()) {
            clauses.push(raw.to_string());
        }

        join(clauses, " AND ")
    }

    /// Renders the filter string.
    pub fn to_filter(&self) -> Option<String> {
        let mut clauses = Vec::new();

        if let Some(item_type) = present(self.item_type.as_ref()) {
            clauses.push(format!("type eq '{item_type}'"));
        }
        for (key, value) in &self.required_tags {
            clauses.push(format!(
                "tags/any(tag: tag/key eq '{key}' and tag/value eq '{value}')"
            ));
        }
        if let Some(raw) = present(self.raw_filter.as_ref()) {
            clauses.push(raw.to_string());
        }

        join(clauses, " and ")
    }
}

/// A matched document with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    /// The matched document.
    pub document: T,
    /// Relevance score.
    #[serde(rename = "@search.score", default)]
    pub score: Option<f64>,
    /// Keys not mapped to a known field.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

/// A library item as indexed for search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySearchResult {
    /// Identifier of the matched item.
    #[serde(rename = "driveItemId")]
    pub id: Uuid,
    /// Library containing the item.
    pub library_id: Uuid,
    /// Path of the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<CloudPath>,
    /// Item name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Item type, `file` or `directory`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub length: i64,
    /// Keys not mapped to a known field.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}
