//! Shared helpers for integration tests.

#![allow(dead_code)]

use integrations_document_library::{DocumentLibraryClient, DocumentLibraryClientBuilder};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::MockServer;

pub const LIBRARY_ID: &str = "3d0c3f55-1b0e-4e0a-9d1c-1c2f0b9d2a10";
pub const TENANT_ID: &str = "0b6f3c1e-3f7a-4d54-8f4f-7a3a5f0e9a01";
pub const API_KEY: &str = "test-subscription-key";

pub fn library_id() -> Uuid {
    Uuid::parse_str(LIBRARY_ID).unwrap()
}

pub fn tenant_id() -> Uuid {
    Uuid::parse_str(TENANT_ID).unwrap()
}

/// Route of a library command, e.g. `/libraries/{id}/cmd/info`.
pub fn command_path(command: &str) -> String {
    format!("/libraries/{LIBRARY_ID}/cmd/{command}")
}

/// A builder pointed at the mock server with an API key set.
pub fn builder_for(server: &MockServer) -> DocumentLibraryClientBuilder {
    DocumentLibraryClient::builder()
        .base_url(server.uri())
        .api_key(API_KEY)
}

/// Starts a mock server and a client talking to it.
pub async fn setup() -> (MockServer, DocumentLibraryClient) {
    let server = MockServer::start().await;
    let client = builder_for(&server).build().unwrap();
    (server, client)
}

pub fn library_json() -> Value {
    json!({
        "libraryId": LIBRARY_ID,
        "tenantId": TENANT_ID,
        "name": "Invoices",
        "location": "C:/libraries/invoices",
        "createdOn": "2019-09-01T10:00:00Z",
        "isSearchEnabled": true,
        "retentionDays": 30
    })
}

pub fn file_json(name: &str) -> Value {
    json!({
        "type": "file",
        "id": "5f0c7f55-7b0e-4e0a-9d1c-1c2f0b9d2a11",
        "tenantId": TENANT_ID,
        "partitionId": "a9f1c1d0-5c55-4a3e-9a5e-2b7d0f3c4e22",
        "libraryPath": format!("/{name}"),
        "createdOn": "2019-09-01T10:00:00Z",
        "lastAccessedOn": "2019-09-02T10:00:00Z",
        "lastModifiedOn": "2019-09-03T10:00:00Z",
        "name": name,
        "length": 5,
        "contentType": "text/plain",
        "isShortcut": false
    })
}

pub fn directory_json(name: &str) -> Value {
    json!({
        "type": "directory",
        "id": "5f0c7f55-7b0e-4e0a-9d1c-1c2f0b9d2a12",
        "tenantId": TENANT_ID,
        "partitionId": "a9f1c1d0-5c55-4a3e-9a5e-2b7d0f3c4e22",
        "libraryPath": format!("/{name}"),
        "createdOn": "2019-09-01T10:00:00Z",
        "lastAccessedOn": "2019-09-01T10:00:00Z",
        "lastModifiedOn": "2019-09-01T10:00:00Z",
        "name": name,
        "hasChildren": false
    })
}

pub fn error_json(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "target": "path",
            "innerError": { "code": "PathNotFound" }
        }
    })
}
