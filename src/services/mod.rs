//! Service implementations for the Document Library API.

mod file_response;
mod interpreter;
mod items;
mod libraries;
mod result;
mod tags;

pub use file_response::FileResponse;
pub use items::ItemsService;
pub use libraries::{LibrariesService, LibrarySearchResults};
pub use result::ApiResult;
pub use tags::TagsService;

use crate::errors::{DocumentLibraryError, DocumentLibraryResult};

/// Rejects a blank required argument before anything is sent.
fn require(value: &str, name: &str) -> DocumentLibraryResult<()> {
    if value.trim().is_empty() {
        return Err(DocumentLibraryError::validation(format!("{name} is required")));
    }
    Ok(())
}
