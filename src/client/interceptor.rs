//! Hook for adjusting requests before they are sent.

use async_trait::async_trait;

use super::Operation;
use crate::errors::DocumentLibraryResult;
use crate::transport::HttpRequest;

/// Inspects or modifies a fully prepared request.
///
/// The interceptor runs once per call, after the route, query string,
/// API key and configured headers are in place and before any policy
/// runs. Returning an error aborts the call without sending anything.
///
/// Plain closures implement this trait:
///
/// ```
/// use integrations_document_library::client::{Operation, RequestInterceptor};
/// use integrations_document_library::transport::HttpRequest;
/// use integrations_document_library::DocumentLibraryResult;
///
/// fn correlation(_: Operation, request: &mut HttpRequest) -> DocumentLibraryResult<()> {
///     request.headers.insert("x-correlation-id", "42".parse().unwrap());
///     Ok(())
/// }
///
/// fn accepts(_: impl RequestInterceptor) {}
/// accepts(correlation);
/// ```
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Called with the operation and its request.
    async fn intercept(
        &self,
        operation: Operation,
        request: &mut HttpRequest,
    ) -> DocumentLibraryResult<()>;
}

#[async_trait]
impl<F> RequestInterceptor for F
where
    F: Fn(Operation, &mut HttpRequest) -> DocumentLibraryResult<()> + Send + Sync,
{
    async fn intercept(
        &self,
        operation: Operation,
        request: &mut HttpRequest,
    ) -> DocumentLibraryResult<()> {
        self(operation, request)
    }
}
