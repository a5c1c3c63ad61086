//! File tag operations.

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::{interpreter, require, ApiResult};
use crate::client::{Operation, RequestBuilder, RequestExecutor, RequestOptions};
use crate::errors::DocumentLibraryResult;
use crate::transport::HttpResponse;
use crate::types::{CloudPath, UpsertFileTagsRequest};

/// Service for the key/value tags attached to files.
#[derive(Debug, Clone)]
pub struct TagsService {
    executor: Arc<RequestExecutor>,
}

impl TagsService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    fn at_path(operation: Operation, library_id: Uuid, path: &CloudPath) -> RequestBuilder {
        RequestBuilder::for_operation(operation)
            .replace_token("libraryId", library_id)
            .query("path", Some(path))
            .accept_json()
    }

    /// Sends a list-tags request.
    pub async fn list_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::at_path(Operation::ListFileTags, library_id, path);
        self.executor
            .execute(Operation::ListFileTags, builder, options)
            .await
    }

    /// Lists the tags of a file.
    pub async fn list_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<HashMap<String, String>>> {
        let response = self.list_response(library_id, path, options).await?;
        interpreter::json(Operation::ListFileTags, response, &options.cancellation_token()).await
    }

    /// Lists the tags of a file. No content yields no tags.
    pub async fn list(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HashMap<String, String>> {
        self.list_result(library_id, path, options)
            .await?
            .into_value_or_default()
    }

    /// Sends an upsert-tags request.
    pub async fn upsert_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        request: &UpsertFileTagsRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        for key in request.tags.keys() {
            require(key, "tag key")?;
        }

        let builder = Self::at_path(Operation::UpsertFileTags, library_id, path).json(request)?;
        self.executor
            .execute(Operation::UpsertFileTags, builder, options)
            .await
    }

    /// Adds tags to a file, replacing values of existing keys.
    pub async fn upsert_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        request: &UpsertFileTagsRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<()>> {
        let response = self
            .upsert_response(library_id, path, request, options)
            .await?;
        interpreter::unit(Operation::UpsertFileTags, response, &options.cancellation_token()).await
    }

    /// Adds tags to a file, replacing values of existing keys.
    ///
    /// ```no_run
    /// # use integrations_document_library::*;
    /// # async fn example(client: DocumentLibraryClient, library: uuid::Uuid) -> DocumentLibraryResult<()> {
    /// let path = CloudPath::new("/invoices/0042.pdf")?;
    /// let tags = UpsertFileTagsRequest::new([("status", "paid"), ("year", "2019")]);
    /// client.tags().upsert(library, &path, &tags, &RequestOptions::default()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upsert(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        request: &UpsertFileTagsRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<()> {
        self.upsert_result(library_id, path, request, options)
            .await?
            .into_unit()
    }

    /// Sends a clear-tags request.
    pub async fn clear_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = Self::at_path(Operation::ClearFileTags, library_id, path);
        self.executor
            .execute(Operation::ClearFileTags, builder, options)
            .await
    }

    /// Removes every tag from a file.
    pub async fn clear_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<()>> {
        let response = self.clear_response(library_id, path, options).await?;
        interpreter::unit(Operation::ClearFileTags, response, &options.cancellation_token()).await
    }

    /// Removes every tag from a file.
    pub async fn clear(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<()> {
        self.clear_result(library_id, path, options)
            .await?
            .into_unit()
    }

    /// Sends a remove-tag request.
    pub async fn remove_response(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        key: &str,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        require(key, "key")?;

        let builder =
            Self::at_path(Operation::RemoveFileTag, library_id, path).query("key", Some(key));
        self.executor
            .execute(Operation::RemoveFileTag, builder, options)
            .await
    }

    /// Removes one tag from a file.
    pub async fn remove_result(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        key: &str,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<()>> {
        let response = self.remove_response(library_id, path, key, options).await?;
        interpreter::unit(Operation::RemoveFileTag, response, &options.cancellation_token()).await
    }

    /// Removes one tag from a file.
    pub async fn remove(
        &self,
        library_id: Uuid,
        path: &CloudPath,
        key: &str,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<()> {
        self.remove_result(library_id, path, key, options)
            .await?
            .into_unit()
    }
}
