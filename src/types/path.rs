//! Cloud paths identifying items inside a library.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DocumentLibraryError;

const SEPARATOR: char = '/';

/// A forward-slash path to an item within a library.
///
/// The value is validated once on construction and is immutable afterwards.
/// It compares, hashes and serializes as its string form.
///
/// ```
/// use integrations_document_library::CloudPath;
///
/// let path: CloudPath = "/reports/2019/q3.pdf".parse()?;
/// assert_eq!(path.file_name(), Some("q3.pdf"));
/// assert_eq!(path.parent().map(|p| p.to_string()), Some("/reports/2019".to_string()));
/// # Ok::<(), integrations_document_library::DocumentLibraryError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CloudPath(String);

impl CloudPath {
    /// Validates and wraps a path.
    pub fn new(path: impl Into<String>) -> Result<Self, DocumentLibraryError> {
        let path = path.into();
        validate(&path)?;
        Ok(Self(path))
    }

    /// The library root, `/`.
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the library root.
    pub fn is_root(&self) -> bool {
        self.segments().next().is_none()
    }

    /// Iterates the non-empty segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// The last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// The containing path, or `None` for the root.
    pub fn parent(&self) -> Option<CloudPath> {
        if self.is_root() {
            return None;
        }

        let trimmed = self.0.trim_end_matches(SEPARATOR);
        match trimmed.rfind(SEPARATOR) {
            Some(0) => Some(Self::root()),
            Some(index) => Some(Self(trimmed[..index].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Appends a single segment.
    pub fn join(&self, segment: &str) -> Result<CloudPath, DocumentLibraryError> {
        if segment.contains(SEPARATOR) {
            return Err(invalid(segment, "a segment cannot contain '/'"));
        }

        let base = self.0.trim_end_matches(SEPARATOR);
        Self::new(format!("{base}{SEPARATOR}{segment}"))
    }
}

fn invalid(path: &str, reason: &str) -> DocumentLibraryError {
    DocumentLibraryError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn validate(path: &str) -> Result<(), DocumentLibraryError> {
    if path.trim().is_empty() {
        return Err(invalid(path, "path is empty"));
    }
    if path.contains('\\') {
        return Err(invalid(path, "use '/' as the separator"));
    }
    if path.chars().any(char::is_control) {
        return Err(invalid(path, "path contains control characters"));
    }

    let relative = path.strip_prefix(SEPARATOR).unwrap_or(path);
    if relative.is_empty() {
        return Ok(());
    }

    for segment in relative.split(SEPARATOR) {
        match segment {
            "" => return Err(invalid(path, "path contains an empty segment")),
            "." | ".." => return Err(invalid(path, "relative segments are not allowed")),
            _ => {}
        }
    }

    Ok(())
}

impl FromStr for CloudPath {
    type Err = DocumentLibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CloudPath {
    type Error = DocumentLibraryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CloudPath {
    type Error = DocumentLibraryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CloudPath> for String {
    fn from(path: CloudPath) -> Self {
        path.0
    }
}

impl AsRef<str> for CloudPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CloudPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/foo.txt", Some("foo.txt"))]
    #[test_case("docs/reports/q1.pdf", Some("q1.pdf"))]
    #[test_case("C:/foo.txt", Some("foo.txt"))]
    #[test_case("/archive/", Some("archive"))]
    #[test_case("/", None)]
    fn test_file_name(input: &str, expected: Option<&str>) {
        let path = CloudPath::new(input).unwrap();
        assert_eq!(path.file_name(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "blank")]
    #[test_case("a\\b"; "backslash")]
    #[test_case("/a//b"; "empty segment")]
    #[test_case("/a/../b"; "parent segment")]
    #[test_case("/a/./b"; "current segment")]
    #[test_case("/a\u{0}b"; "nul")]
    fn test_invalid_paths(input: &str) {
        let err = CloudPath::new(input).unwrap_err();
        assert!(matches!(err, DocumentLibraryError::InvalidPath { .. }));
    }

    #[test]
    fn test_parent() {
        let path = CloudPath::new("/a/b/c.txt").unwrap();
        assert_eq!(path.parent().unwrap().as_str(), "/a/b");
        assert_eq!(CloudPath::new("/a").unwrap().parent(), Some(CloudPath::root()));
        assert_eq!(CloudPath::root().parent(), None);
    }

    #[test]
    fn test_join() {
        let path = CloudPath::new("/a/").unwrap().join("b.txt").unwrap();
        assert_eq!(path.as_str(), "/a/b.txt");
        assert!(CloudPath::root().join("x/y").is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let path = CloudPath::new("/foo/bar.txt").unwrap();
        assert_eq!(serde_json::to_string(&path).unwrap(), r#""/foo/bar.txt""#);

        let decoded: CloudPath = serde_json::from_str(r#""/foo/bar.txt""#).unwrap();
        assert_eq!(decoded, path);

        assert!(serde_json::from_str::<CloudPath>(r#""a/../b""#).is_err());
    }
}
