//! The operations exposed by the Document Library API.

use std::fmt;

use crate::transport::Method;

/// One API operation.
///
/// Operations key the per-operation [`PolicyMap`](crate::resilience::PolicyMap)
/// and name the target of errors the client synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Create a library.
    CreateLibrary,
    /// List libraries.
    ListLibraries,
    /// Get one library.
    GetLibrary,
    /// Full-text search within a library.
    SearchLibrary,
    /// Download a file's content.
    DownloadContent,
    /// Get a file or directory descriptor.
    GetItemInfo,
    /// List the tags of a file.
    ListFileTags,
    /// Insert or update tags on a file.
    UpsertFileTags,
    /// Remove all tags from a file.
    ClearFileTags,
    /// Remove one tag from a file.
    RemoveFileTag,
    /// Delete a file or directory.
    DeleteItem,
    /// List the children of a directory.
    ListChildren,
    /// Check whether a path exists.
    Exists,
    /// Copy an item.
    Copy,
    /// Move an item.
    Move,
    /// Create a directory.
    CreateDirectory,
    /// Upload a file.
    UploadFile,
    /// Register externally stored files.
    ImportFiles,
    /// Run an anti-virus scan on a file.
    AntiVirusScanFile,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 19] = [
        Operation::CreateLibrary,
        Operation::ListLibraries,
        Operation::GetLibrary,
        Operation::SearchLibrary,
        Operation::DownloadContent,
        Operation::GetItemInfo,
        Operation::ListFileTags,
        Operation::UpsertFileTags,
        Operation::ClearFileTags,
        Operation::RemoveFileTag,
        Operation::DeleteItem,
        Operation::ListChildren,
        Operation::Exists,
        Operation::Copy,
        Operation::Move,
        Operation::CreateDirectory,
        Operation::UploadFile,
        Operation::ImportFiles,
        Operation::AntiVirusScanFile,
    ];

    /// The operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateLibrary => "CreateLibrary",
            Operation::ListLibraries => "ListLibraries",
            Operation::GetLibrary => "GetLibrary",
            Operation::SearchLibrary => "SearchLibrary",
            Operation::DownloadContent => "DownloadContent",
            Operation::GetItemInfo => "GetItemInfo",
            Operation::ListFileTags => "ListFileTags",
            Operation::UpsertFileTags => "UpsertFileTags",
            Operation::ClearFileTags => "ClearFileTags",
            Operation::RemoveFileTag => "RemoveFileTag",
            Operation::DeleteItem => "DeleteItem",
            Operation::ListChildren => "ListChildren",
            Operation::Exists => "Exists",
            Operation::Copy => "Copy",
            Operation::Move => "Move",
            Operation::CreateDirectory => "CreateDirectory",
            Operation::UploadFile => "UploadFile",
            Operation::ImportFiles => "ImportFiles",
            Operation::AntiVirusScanFile => "AntiVirusScanFile",
        }
    }

    /// The target reported by errors the client synthesizes for this
    /// operation, e.g. `DocumentLibraryClient.GetLibrary`.
    pub fn target(&self) -> String {
        format!("DocumentLibraryClient.{}", self.name())
    }

    /// HTTP method of the operation.
    pub fn method(&self) -> Method {
        match self {
            Operation::ListLibraries
            | Operation::GetLibrary
            | Operation::SearchLibrary
            | Operation::DownloadContent
            | Operation::GetItemInfo
            | Operation::ListFileTags
            | Operation::ListChildren
            | Operation::Exists => Method::Get,
            Operation::CreateLibrary
            | Operation::UpsertFileTags
            | Operation::ClearFileTags
            | Operation::RemoveFileTag
            | Operation::DeleteItem
            | Operation::Copy
            | Operation::Move
            | Operation::CreateDirectory
            | Operation::UploadFile
            | Operation::ImportFiles
            | Operation::AntiVirusScanFile => Method::Post,
        }
    }

    /// Route template, relative to the base URL.
    pub fn route(&self) -> &'static str {
        match self {
            Operation::CreateLibrary | Operation::ListLibraries => "libraries",
            Operation::GetLibrary => "libraries/{libraryId}",
            Operation::SearchLibrary => "libraries/{libraryId}/search",
            Operation::DownloadContent => "libraries/{libraryId}/cmd/download",
            Operation::GetItemInfo => "libraries/{libraryId}/cmd/info",
            Operation::ListFileTags => "libraries/{libraryId}/cmd/list-tags",
            Operation::UpsertFileTags => "libraries/{libraryId}/cmd/upsert-tags",
            Operation::ClearFileTags => "libraries/{libraryId}/cmd/clear-tags",
            Operation::RemoveFileTag => "libraries/{libraryId}/cmd/remove-tag",
            Operation::DeleteItem => "libraries/{libraryId}/cmd/delete",
            Operation::ListChildren => "libraries/{libraryId}/cmd/dir",
            Operation::Exists => "libraries/{libraryId}/cmd/exists",
            Operation::Copy => "libraries/{libraryId}/cmd/copy",
            Operation::Move => "libraries/{libraryId}/cmd/move",
            // Directories and uploads share an endpoint; the multipart body
            // tells them apart.
            Operation::CreateDirectory | Operation::UploadFile => "libraries/{libraryId}/cmd/create",
            Operation::ImportFiles => "libraries/{libraryId}/cmd/import",
            Operation::AntiVirusScanFile => "libraries/{libraryId}/cmd/avscan",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test]
    fn test_all_operations_are_distinct() {
        let unique: HashSet<_> = Operation::ALL.iter().collect();
        assert_eq!(unique.len(), Operation::ALL.len());
    }

    #[test_case(Operation::GetLibrary, "DocumentLibraryClient.GetLibrary")]
    #[test_case(Operation::AntiVirusScanFile, "DocumentLibraryClient.AntiVirusScanFile")]
    fn test_target(operation: Operation, expected: &str) {
        assert_eq!(operation.target(), expected);
    }

    #[test_case(Operation::Exists, Method::Get, "libraries/{libraryId}/cmd/exists")]
    #[test_case(Operation::CreateLibrary, Method::Post, "libraries")]
    #[test_case(Operation::UploadFile, Method::Post, "libraries/{libraryId}/cmd/create")]
    #[test_case(Operation::SearchLibrary, Method::Get, "libraries/{libraryId}/search")]
    fn test_route_table(operation: Operation, method: Method, route: &str) {
        assert_eq!(operation.method(), method);
        assert_eq!(operation.route(), route);
    }
}
