//! File and directory operations.
//!
//! Items are addressed by library id and [`CloudPath`]. Each operation has a
//! raw `_response` form, a `_result` form returning [`ApiResult`], and a
//! plain form that raises service errors.

use std::sync::Arc;
use uuid::Uuid;

use super::{interpreter, ApiResult, FileResponse};
use crate::client::{Operation, RequestBuilder, RequestExecutor, RequestOptions};
use crate::errors::{DocumentLibraryError, DocumentLibraryResult};
use crate::transport::{HttpResponse, MultipartFile};
use crate::types::items::DEFAULT_CONTENT_TYPE;
use crate::types::{
    AntiVirusScanResult, CloudPath, ExistsResponse, FileUpload, ImportFilesRequest,
    LibraryDirectoryInfo, LibraryFileInfo, LibraryItemInfo,
};

/// Name of the multipart part carrying upload content.
const UPLOAD_PART: &str = "data";

/// Service for file and directory operations.
#[derive(Debug, Clone)]
pub struct ItemsService {
    executor: Arc<RequestExecutor>,
}

impl ItemsService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// A request for an operation addressed by library and path.
    fn at_path(operation: Operation, library_id: Uuid, path: &CloudPath) -> RequestBuilder {
        RequestBuilder::for_operation(operation)
            .replace_token("libraryId", library_id)
            .query("path", Some(path))
    }

    // ========================================================================
    // Download / Info
    // ========================================================================

    /// Sends a download request. The response body is the file content.
    pub async fn download_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::at_path(Operation::DownloadContent, library_id, path);
        self.executor
            .execute(Operation::DownloadContent, builder, options)
            .await
    }

    /// Downloads a file, leaving its content on the wire.
    pub async fn download_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<FileResponse>> {
        let response = self.download_response(library_id, path, options).await?;
        interpreter::download(
            Operation::DownloadContent,
            response,
            &options.cancellation_token(),
        )
        .await
    }

    /// Downloads a file.
    ///
    /// ```no_run
    /// # use integrations_document_library::*;
    /// # use futures::StreamExt;
    /// # async fn example(client: DocumentLibraryClient, library: uuid::Uuid) -> DocumentLibraryResult<()> {
    /// let path = CloudPath::new("/reports/2019.pdf")?;
    /// let file = client.items().download(library, &path, &RequestOptions::default()).await?;
    /// let mut stream = file.into_stream();
    /// while let Some(chunk) = stream.next().await {
    ///     let chunk = chunk?;
    ///     println!("read {} bytes", chunk.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<FileResponse> {
        self.download_result(library_id, path, options)
            .await?
            .into_value(Operation::DownloadContent)
    }

    /// Sends an item-info request.
    pub async fn info_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::at_path(Operation::GetItemInfo, library_id, path).accept_json();
        self.executor
            .execute(Operation::GetItemInfo, builder, options)
            .await
    }

    /// Gets the descriptor of a file or directory.
    pub async fn info_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<LibraryItemInfo>> {
        let response = self.info_response(library_id, path, options).await?;
        interpreter::json(Operation::GetItemInfo, response, &options.cancellation_token()).await
    }

    /// Gets the descriptor of a file or directory.
    pub async fn info(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<LibraryItemInfo> {
        self.info_result(library_id, path, options)
            .await?
            .into_value(Operation::GetItemInfo)
    }

    // ========================================================================
    // Delete / List / Exists
    // ========================================================================

    /// Sends a delete request.
    pub async fn delete_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::at_path(Operation::DeleteItem, library_id, path).accept_json();
        self.executor
            .execute(Operation::DeleteItem, builder, options)
            .await
    }

    /// Deletes a file or directory.
    pub async fn delete_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<()>> {
        let response = self.delete_response(library_id, path, options).await?;
        interpreter::unit(Operation::DeleteItem, response, &options.cancellation_token()).await
    }

    /// Deletes a file or directory.
    pub async fn delete(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<()> {
        self.delete_result(library_id, path, options)
            .await?
            .into_unit()
    }

    /// Sends a list-children request.
    pub async fn list_children_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::at_path(Operation::ListChildren, library_id, path).accept_json();
        self.executor
            .execute(Operation::ListChildren, builder, options)
            .await
    }

    /// Lists the files and directories directly below `path`.
    pub async fn list_children_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<Vec<LibraryItemInfo>>> {
        let response = self
            .list_children_response(library_id, path, options)
            .await?;
        interpreter::json(Operation::ListChildren, response, &options.cancellation_token()).await
    }

    /// Lists the files and directories directly below `path`.
    pub async fn list_children(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<Vec<LibraryItemInfo>> {
        self.list_children_result(library_id, path, options)
            .await?
            .into_value_or_default()
    }

    /// Sends an exists request.
    pub async fn exists_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::at_path(Operation::Exists, library_id, path).accept_json();
        self.executor
            .execute(Operation::Exists, builder, options)
            .await
    }

    /// Checks whether `path` exists, keeping the full answer.
    pub async fn exists_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<ExistsResponse>> {
        let response = self.exists_response(library_id, path, options).await?;
        interpreter::json(Operation::Exists, response, &options.cancellation_token()).await
    }

    /// Checks whether `path` exists. No content counts as absent.
    pub async fn exists(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<bool> {
        self.exists_result(library_id, path, options)
            .await?
            .map(|answer| answer.exists)
            .into_value_or_default()
    }

    // ========================================================================
    // Copy / Move
    // ========================================================================

    fn transfer(
        operation: Operation,
        library_id: Uuid,
        source: &CloudPath,
        target: &CloudPath,
    ) -> RequestBuilder {
        RequestBuilder::for_operation(operation)
            .replace_token("libraryId", library_id)
            .query("source", Some(source))
            .query("target", Some(target))
            .accept_json()
    }

    /// Sends a copy request.
    pub async fn copy_response(
        &self,
        library_id: Uuid,
        source: &CloudPath,
        target: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::transfer(Operation::Copy, library_id, source, target);
        self.executor.execute(Operation::Copy, builder, options).await
    }

    /// Copies `source` to `target`.
    pub async fn copy_result(
        &self,
        library_id: Uuid,
        source: &CloudPath,
        target: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<()>> {
        let response = self
            .copy_response(library_id, source, target, options)
            .await?;
        interpreter::unit(Operation::Copy, response, &options.cancellation_token()).await
    }

    /// Copies `source` to `target`.
    pub async fn copy(
        &self,
        library_id: Uuid,
        source: &CloudPath,
        target: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<()> {
        self.copy_result(library_id, source, target, options)
            .await?
            .into_unit()
    }

    /// Sends a move request.
    pub async fn move_item_response(
        &self,
        library_id: Uuid,
        source: &CloudPath,
        target: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::transfer(Operation::Move, library_id, source, target);
        self.executor.execute(Operation::Move, builder, options).await
    }

    /// Moves `source` to `target`.
    pub async fn move_item_result(
        &self,
        library_id: Uuid,
        source: &CloudPath,
        target: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<()>> {
        let response = self
            .move_item_response(library_id, source, target, options)
            .await?;
        interpreter::unit(Operation::Move, response, &options.cancellation_token()).await
    }

    /// Moves `source` to `target`.
    pub async fn move_item(
        &self,
        library_id: Uuid,
        source: &CloudPath,
        target: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<()> {
        self.move_item_result(library_id, source, target, options)
            .await?
            .into_unit()
    }

    // ========================================================================
    // Create directory / Upload / Import
    // ========================================================================

    /// Sends a create-directory request.
    pub async fn create_directory_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::at_path(Operation::CreateDirectory, library_id, path).accept_json();
        self.executor
            .execute(Operation::CreateDirectory, builder, options)
            .await
    }

    /// Creates a directory.
    pub async fn create_directory_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<LibraryDirectoryInfo>> {
        let response = self
            .create_directory_response(library_id, path, options)
            .await?;
        interpreter::json(
            Operation::CreateDirectory,
            response,
            &options.cancellation_token(),
        )
        .await
    }

    /// Creates a directory.
    pub async fn create_directory(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<LibraryDirectoryInfo> {
        self.create_directory_result(library_id, path, options)
            .await?
            .into_value(Operation::CreateDirectory)
    }

    /// Sends an upload request.
    pub async fn upload_response(
        &self,
        library_id: Uuid,
        upload: &FileUpload,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let file_name = upload.path.file_name().ok_or_else(|| {
            DocumentLibraryError::validation("upload path must name a file, not the root")
        })?;

        let file = MultipartFile {
            field_name: UPLOAD_PART.to_string(),
            file_name: file_name.to_string(),
            content_type: upload
                .content_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            content: upload.content.clone(),
        };

        let builder = Self::at_path(Operation::UploadFile, library_id, &upload.path)
            .query("overwrite", Some(upload.overwrite))
            .accept_json()
            .multipart(file);
        self.executor
            .execute(Operation::UploadFile, builder, options)
            .await
    }

    /// Uploads a file.
    pub async fn upload_result(
        &self,
        library_id: Uuid,
        upload: &FileUpload,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<LibraryFileInfo>> {
        let response = self.upload_response(library_id, upload, options).await?;
        interpreter::json(Operation::UploadFile, response, &options.cancellation_token()).await
    }

    /// Uploads a file.
    ///
    /// ```no_run
    /// # use integrations_document_library::*;
    /// # async fn example(client: DocumentLibraryClient, library: uuid::Uuid) -> DocumentLibraryResult<()> {
    /// let upload = FileUpload::new(CloudPath::new("/notes/todo.txt")?, "buy milk")
    ///     .content_type("text/plain")
    ///     .overwrite(true);
    /// let file = client.items().upload(library, &upload, &RequestOptions::default()).await?;
    /// println!("{} bytes stored", file.length);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload(
        &self,
        library_id: Uuid,
        upload: &FileUpload,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<LibraryFileInfo> {
        self.upload_result(library_id, upload, options)
            .await?
            .into_value(Operation::UploadFile)
    }

    /// Sends an import request.
    pub async fn import_response(
        &self,
        library_id: Uuid,
        path: Option<&CloudPath>,
        request: &ImportFilesRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        if request.files.is_empty() {
            return Err(DocumentLibraryError::validation(
                "import request must contain at least one file",
            ));
        }

        let builder = RequestBuilder::for_operation(Operation::ImportFiles)
            .replace_token("libraryId", library_id)
            .query("path", path)
            .accept_json()
            .json(request)?;
        self.executor
            .execute(Operation::ImportFiles, builder, options)
            .await
    }

    /// Registers files held in an external store.
    pub async fn import_result(
        &self,
        library_id: Uuid,
        path: Option<&CloudPath>,
        request: &ImportFilesRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<Vec<LibraryFileInfo>>> {
        let response = self
            .import_response(library_id, path, request, options)
            .await?;
        interpreter::json(Operation::ImportFiles, response, &options.cancellation_token()).await
    }

    /// Registers files held in an external store.
    pub async fn import(
        &self,
        library_id: Uuid,
        path: Option<&CloudPath>,
        request: &ImportFilesRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<Vec<LibraryFileInfo>> {
        self.import_result(library_id, path, request, options)
            .await?
            .into_value_or_default()
    }

    // ========================================================================
    // Anti-virus
    // ========================================================================

    /// Sends an anti-virus scan request.
    pub async fn anti_virus_scan_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder =
            Self::at_path(Operation::AntiVirusScanFile, library_id, path).accept_json();
        self.executor
            .execute(Operation::AntiVirusScanFile, builder, options)
            .await
    }

    /// Scans a file for viruses.
    pub async fn anti_virus_scan_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<AntiVirusScanResult>> {
        let response = self
            .anti_virus_scan_response(library_id, path, options)
            .await?;
        interpreter::json(
            Operation::AntiVirusScanFile,
            response,
            &options.cancellation_token(),
        )
        .await
    }

    /// Scans a file for viruses.
    pub async fn anti_virus_scan(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<AntiVirusScanResult> {
        self.anti_virus_scan_result(library_id, path, options)
            .await?
            .into_value(Operation::AntiVirusScanFile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DocumentLibraryClient;
    use crate::mocks::{MockResponse, MockTransport};
    use crate::transport::RequestBody;
    use crate::types::ImportRecord;

    fn client(transport: &Arc<MockTransport>) -> DocumentLibraryClient {
        DocumentLibraryClient::builder()
            .base_url("https://docs.example.com")
            .transport(Arc::clone(transport) as _)
            .build()
            .unwrap()
    }

    fn path(value: &str) -> CloudPath {
        CloudPath::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_upload_builds_data_part() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(MockResponse::empty(500));

        let upload = FileUpload::new(path("/docs/a.txt"), "hello");
        let _ = client(&transport)
            .items()
            .upload_result(Uuid::nil(), &upload, &RequestOptions::default())
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.query_param("overwrite").as_deref(), Some("false"));
        assert_eq!(request.query_param("path").as_deref(), Some("/docs/a.txt"));
        match request.body {
            RequestBody::Multipart(file) => {
                assert_eq!(file.field_name, "data");
                assert_eq!(file.file_name, "a.txt");
                assert_eq!(file.content_type, "application/octet-stream");
                assert_eq!(&file.content[..], b"hello");
            }
            other => panic!("Expected multipart body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_to_root_is_rejected() {
        let transport = Arc::new(MockTransport::new());
        let result = client(&transport)
            .items()
            .upload(
                Uuid::nil(),
                &FileUpload::new(CloudPath::root(), "x"),
                &RequestOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(DocumentLibraryError::Validation { .. })));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_import_without_files_is_rejected() {
        let transport = Arc::new(MockTransport::new());
        let result = client(&transport)
            .items()
            .import(
                Uuid::nil(),
                None,
                &ImportFilesRequest { files: Vec::new() },
                &RequestOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(DocumentLibraryError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_import_omits_absent_path() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(MockResponse::json(200, "[]"));

        let request = ImportFilesRequest {
            files: vec![ImportRecord::new("a.pdf", "blob-1")],
        };
        let imported = client(&transport)
            .items()
            .import(Uuid::nil(), None, &request, &RequestOptions::default())
            .await
            .unwrap();

        assert!(imported.is_empty());
        assert_eq!(transport.last_request().unwrap().query_param("path"), None);
    }

    #[tokio::test]
    async fn test_copy_sends_source_and_target() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(MockResponse::empty(200));

        client(&transport)
            .items()
            .copy(Uuid::nil(), &path("/a.txt"), &path("/b.txt"), &RequestOptions::default())
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert!(request.url.path().ends_with("/cmd/copy"));
        assert_eq!(request.query_param("source").as_deref(), Some("/a.txt"));
        assert_eq!(request.query_param("target").as_deref(), Some("/b.txt"));
    }

    #[tokio::test]
    async fn test_exists_maps_to_bool() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(MockResponse::json(200, r#"{"exists":true}"#));
        transport.push_response(MockResponse::empty(204));

        let items = client(&transport).items();
        let options = RequestOptions::default();
        assert!(items.exists(Uuid::nil(), &path("/a"), &options).await.unwrap());
        assert!(!items.exists(Uuid::nil(), &path("/a"), &options).await.unwrap());
    }
}
