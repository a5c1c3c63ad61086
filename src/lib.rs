//! Document Library Client
//!
//! An async Rust client for the Document Library API: tenant-scoped
//! libraries of files and directories with tagging, search, streaming
//! download, multipart upload, import and anti-virus scanning.
//!
//! # Features
//!
//! - **Three layers per operation**: raw response, [`ApiResult`] and a
//!   plain method that raises service errors
//! - **Streaming downloads**: only headers are read before the caller gets
//!   the body stream
//! - **Resilience**: per-operation retry and circuit breaker policies
//! - **Cancellation**: every call accepts a `CancellationToken`
//! - **Observability**: structured `tracing` events, secrets never logged
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use integrations_document_library::{
//!     CloudPath, DocumentLibraryClient, PolicyMap, RequestOptions, RetryPolicy,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DocumentLibraryClient::builder()
//!         .base_url("https://library.example.com/api")
//!         .api_key("your-subscription-key")
//!         .policies(PolicyMap::builder().default_policy(RetryPolicy::default()).build())
//!         .build()?;
//!
//!     let options = RequestOptions::default();
//!     for library in client.libraries().list(&options).await? {
//!         let root = CloudPath::root();
//!         let children = client.items().list_children(library.library_id, &root, &options).await?;
//!         println!("{}: {} items", library.name, children.len());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod resilience;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use auth::{StaticTokenProvider, TokenInfo, TokenProvider};
pub use client::{
    DocumentLibraryClient, DocumentLibraryClientBuilder, Operation, RequestInterceptor,
    RequestOptions,
};
pub use config::{DocumentLibraryConfig, DocumentLibraryConfigBuilder};
pub use errors::{ApiError, DocumentLibraryError, DocumentLibraryResult};
pub use resilience::{
    CircuitBreakerConfig, CircuitBreakerPolicy, PolicyChain, PolicyMap, RequestPolicy,
    RetryConfig, RetryPolicy,
};
pub use services::{ApiResult, FileResponse, ItemsService, LibrariesService, TagsService};

// Type re-exports
pub use types::{
    AntiVirusScanResult, CloudPath, CreateLibraryRequest, ExistsResponse, FileUpload,
    ImportFilesRequest, ImportRecord, Library, LibraryDirectoryInfo, LibraryFileInfo,
    LibraryItemInfo, LibrarySearchResult, SearchRequest, SearchResult, UpsertFileTagsRequest,
};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
