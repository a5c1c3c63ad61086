//! Library-level operations: create, list, get and search.

use std::sync::Arc;
use uuid::Uuid;

use super::{interpreter, require, ApiResult};
use crate::client::{Operation, RequestBuilder, RequestExecutor, RequestOptions};
use crate::errors::{DocumentLibraryError, DocumentLibraryResult};
use crate::transport::HttpResponse;
use crate::types::{CreateLibraryRequest, Library, LibrarySearchResult, SearchRequest, SearchResult};

/// Search hits returned by the search endpoint.
pub type LibrarySearchResults = Vec<SearchResult<LibrarySearchResult>>;

/// Service for library operations.
///
/// Every operation comes in three layers:
/// - `<op>_response` returns the raw response with its body unread
/// - `<op>_result` returns an [`ApiResult`], with service errors as values
/// - `<op>` returns the value and raises service errors as
///   [`DocumentLibraryError::Api`]
#[derive(Debug, Clone)]
pub struct LibrariesService {
    executor: Arc<RequestExecutor>,
}

impl LibrariesService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Sends a create-library request.
    pub async fn create_response(
        &self,
        request: &CreateLibraryRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        require(&request.name, "name")?;

        let builder = RequestBuilder::for_operation(Operation::CreateLibrary)
            .accept_json()
            .json(request)?;

        self.executor
            .execute(Operation::CreateLibrary, builder, options)
            .await
    }

    /// Creates a library.
    pub async fn create_result(
        &self,
        request: &CreateLibraryRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<Library>> {
        let response = self.create_response(request, options).await?;
        interpreter::json(
            Operation::CreateLibrary,
            response,
            &options.cancellation_token(),
        )
        .await
    }

    /// Creates a library.
    ///
    /// ```no_run
    /// # use integrations_document_library::*;
    /// # async fn example(client: DocumentLibraryClient) -> DocumentLibraryResult<()> {
    /// let request = CreateLibraryRequest::new("contracts").enable_search(true);
    /// let library = client
    ///     .libraries()
    ///     .create(&request, &RequestOptions::default())
    ///     .await?;
    /// println!("Created {} ({})", library.name, library.library_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(
        &self,
        request: &CreateLibraryRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<Library> {
        self.create_result(request, options)
            .await?
            .into_value(Operation::CreateLibrary)
    }

    // ========================================================================
    // List / Get
    // ========================================================================

    /// Sends a list-libraries request.
    pub async fn list_response(
        &self,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = RequestBuilder::for_operation(Operation::ListLibraries).accept_json();
        self.executor
            .execute(Operation::ListLibraries, builder, options)
            .await
    }

    /// Lists the libraries of the tenant.
    pub async fn list_result(
        &self,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<Vec<Library>>> {
        let response = self.list_response(options).await?;
        interpreter::json(
            Operation::ListLibraries,
            response,
            &options.cancellation_token(),
        )
        .await
    }

    /// Lists the libraries of the tenant. No content yields an empty list.
    pub async fn list(&self, options: &RequestOptions) -> DocumentLibraryResult<Vec<Library>> {
        self.list_result(options).await?.into_value_or_default()
    }

    /// Sends a get-library request.
    pub async fn get_response(
        &self,
        library_id: Uuid,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let builder = RequestBuilder::for_operation(Operation::GetLibrary)
            .replace_token("libraryId", library_id)
            .accept_json();
        self.executor
            .execute(Operation::GetLibrary, builder, options)
            .await
    }

    /// Gets one library.
    pub async fn get_result(
        &self,
        library_id: Uuid,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<Library>> {
        let response = self.get_response(library_id, options).await?;
        interpreter::json(Operation::GetLibrary, response, &options.cancellation_token()).await
    }

    /// Gets one library.
    pub async fn get(
        &self,
        library_id: Uuid,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<Library> {
        self.get_result(library_id, options)
            .await?
            .into_value(Operation::GetLibrary)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Sends a search request with a raw query and optional filter.
    ///
    /// The query may be blank when a filter is given; it is then sent empty.
    pub async fn search_response(
        &self,
        library_id: Uuid,
        query: &str,
        filter: Option<&str>,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let filter = filter.filter(|f| !f.trim().is_empty());
        if filter.is_none() {
            require(query, "query")?;
        }

        let builder = RequestBuilder::for_operation(Operation::SearchLibrary)
            .replace_token("libraryId", library_id)
            .query("query", Some(query.trim()))
            .query("filter", filter)
            .accept_json();
        self.executor
            .execute(Operation::SearchLibrary, builder, options)
            .await
    }

    /// Searches a library.
    pub async fn search_result(
        &self,
        library_id: Uuid,
        query: &str,
        filter: Option<&str>,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<LibrarySearchResults>> {
        let response = self
            .search_response(library_id, query, filter, options)
            .await?;
        interpreter::json(
            Operation::SearchLibrary,
            response,
            &options.cancellation_token(),
        )
        .await
    }

    /// Searches a library. No content yields no hits.
    pub async fn search(
        &self,
        library_id: Uuid,
        query: &str,
        filter: Option<&str>,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<LibrarySearchResults> {
        self.search_result(library_id, query, filter, options)
            .await?
            .into_value_or_default()
    }

    /// Sends a search built from a [`SearchRequest`].
    pub async fn search_request_response(
        &self,
        library_id: Uuid,
        request: &SearchRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let query = request.to_query();
        let filter = request.to_filter();
        if query.is_none() && filter.is_none() {
            return Err(DocumentLibraryError::validation(
                "search request has no query or filter clause",
            ));
        }
        let query = query.unwrap_or_default();

        self.search_response(library_id, &query, filter.as_deref(), options)
            .await
    }

    /// Searches a library with a [`SearchRequest`].
    pub async fn search_request_result(
        &self,
        library_id: Uuid,
        request: &SearchRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<ApiResult<LibrarySearchResults>> {
        let response = self
            .search_request_response(library_id, request, options)
            .await?;
        interpreter::json(
            Operation::SearchLibrary,
            response,
            &options.cancellation_token(),
        )
        .await
    }

    /// Searches a library with a [`SearchRequest`].
    ///
    /// ```no_run
    /// # use integrations_document_library::*;
    /// # async fn example(client: DocumentLibraryClient, library: uuid::Uuid) -> DocumentLibraryResult<()> {
    /// let request = SearchRequest::new()
    ///     .name_query("invoice*")
    ///     .required_tag("year", "2019");
    /// for hit in client.libraries().search_request(library, &request, &RequestOptions::default()).await? {
    ///     println!("{:?} scored {:?}", hit.document.path, hit.score);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search_request(
        &self,
        library_id: Uuid,
        request: &SearchRequest,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<LibrarySearchResults> {
        self.search_request_result(library_id, request, options)
            .await?
            .into_value_or_default()
    }
}
