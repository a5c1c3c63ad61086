//! Request and response types for the Document Library API.

pub mod commands;
pub mod items;
pub mod library;
pub mod path;
pub mod search;

pub use commands::{
    AntiVirusScanResult, ExistsResponse, FileUpload, ImportFilesRequest, ImportRecord, LibraryFileStream,
    UpsertFileTagsRequest,
};
pub use items::{
    DirectoryKind, FileKind, ItemProperties, LibraryDirectoryInfo, LibraryFileInfo,
    LibraryItemInfo, UnknownDiscriminatorError, DEFAULT_CONTENT_TYPE,
};
pub use library::{CreateLibraryRequest, Library};
pub use path::CloudPath;
pub use search::{LibrarySearchResult, SearchRequest, SearchResult};
