//! The outcome of an operation as seen by the Result layer.

use crate::client::Operation;
use crate::errors::{ApiError, DocumentLibraryError, DocumentLibraryResult};

/// A decoded response: a value, an empty success, or an error reported by
/// the service.
///
/// Raised faults (transport failures, cancellation, undecodable payloads)
/// are not represented here; they travel in the outer
/// [`DocumentLibraryResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult<T> {
    /// The service returned a value.
    Success(T),
    /// The service answered 204.
    NoContent,
    /// The service reported an error.
    Failure(ApiError),
}

impl<T> ApiResult<T> {
    /// True for [`ApiResult::Success`] and [`ApiResult::NoContent`].
    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    /// True for [`ApiResult::Failure`].
    pub fn is_failure(&self) -> bool {
        matches!(self, ApiResult::Failure(_))
    }

    /// The value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            ApiResult::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The reported error, if any.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            ApiResult::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// Maps the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            ApiResult::Success(value) => ApiResult::Success(f(value)),
            ApiResult::NoContent => ApiResult::NoContent,
            ApiResult::Failure(error) => ApiResult::Failure(error),
        }
    }

    /// Converts to a `Result`, with `None` standing for no content.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        match self {
            ApiResult::Success(value) => Ok(Some(value)),
            ApiResult::NoContent => Ok(None),
            ApiResult::Failure(error) => Err(error),
        }
    }

    /// Returns the value, raising service errors and treating no content
    /// as a fault of `operation`.
    pub fn into_value(self, operation: Operation) -> DocumentLibraryResult<T> {
        match self {
            ApiResult::Success(value) => Ok(value),
            ApiResult::NoContent => Err(DocumentLibraryError::MissingContent {
                operation: operation.target(),
            }),
            ApiResult::Failure(error) => Err(DocumentLibraryError::api(error)),
        }
    }

    /// Returns the value, or the default for no content.
    pub fn into_value_or_default(self) -> DocumentLibraryResult<T>
    where
        T: Default,
    {
        match self {
            ApiResult::Success(value) => Ok(value),
            ApiResult::NoContent => Ok(T::default()),
            ApiResult::Failure(error) => Err(DocumentLibraryError::api(error)),
        }
    }

    /// Discards any value, raising service errors.
    pub fn into_unit(self) -> DocumentLibraryResult<()> {
        match self {
            ApiResult::Success(_) | ApiResult::NoContent => Ok(()),
            ApiResult::Failure(error) => Err(DocumentLibraryError::api(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorDetail;

    #[test]
    fn test_no_content_on_single_value_raises() {
        let result: ApiResult<u32> = ApiResult::NoContent;
        match result.into_value(Operation::GetLibrary) {
            Err(DocumentLibraryError::MissingContent { operation }) => {
                assert_eq!(operation, "DocumentLibraryClient.GetLibrary");
            }
            other => panic!("Expected MissingContent, got {other:?}"),
        }
    }

    #[test]
    fn test_no_content_on_collection_is_empty() {
        let result: ApiResult<Vec<u32>> = ApiResult::NoContent;
        assert!(result.into_value_or_default().unwrap().is_empty());
    }

    #[test]
    fn test_failure_is_raised_with_payload() {
        let result: ApiResult<()> =
            ApiResult::Failure(ApiError::Domain(ErrorDetail::new("NotFound", "gone")));
        let error = result.into_unit().unwrap_err();

        assert_eq!(error.api_error().map(ApiError::code), Some("NotFound"));
    }

    #[test]
    fn test_map_and_into_result() {
        let result = ApiResult::Success(2).map(|v| v * 2);
        assert_eq!(result.value(), Some(&4));
        assert_eq!(result.into_result(), Ok(Some(4)));
        assert_eq!(ApiResult::<u8>::NoContent.into_result(), Ok(None));
    }
}
