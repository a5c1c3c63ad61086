//! Library items: files and directories.
//!
//! Items travel as one JSON object with a `"type"` discriminator. Decoding
//! switches on that field through a fixed table and rejects anything that is
//! not `"file"` or `"directory"`. Encoding writes the discriminator first,
//! then the shared fields, then the variant fields, then any unmapped keys
//! that were captured on decode.
//!
//! The discriminator is a typed field of each variant, so a variant decoded
//! on its own checks the tag and never keeps it in its extension bag.

use chrono::{DateTime, Utc};
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::path::CloudPath;

/// Discriminator field name.
pub const TYPE_FIELD: &str = "type";

/// Discriminator value of [`LibraryFileInfo`].
pub const FILE_TYPE: &str = "file";

/// Discriminator value of [`LibraryDirectoryInfo`].
pub const DIRECTORY_TYPE: &str = "directory";

/// Content type assumed when none is provided.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub(crate) fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

/// The `"type"` field of an item was missing or not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown library item discriminator: {}", .found.as_deref().unwrap_or("<missing>"))]
pub struct UnknownDiscriminatorError {
    /// The value that was found, if any.
    pub found: Option<String>,
}

fn expect_tag<'de, D: Deserializer<'de>>(
    deserializer: D,
    expected: &'static str,
) -> Result<(), D::Error> {
    let found = String::deserialize(deserializer)?;
    if found == expected {
        Ok(())
    } else {
        Err(D::Error::invalid_value(Unexpected::Str(&found), &expected))
    }
}

/// The `"type": "file"` tag of [`LibraryFileInfo`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileKind;

impl Serialize for FileKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(FILE_TYPE)
    }
}

impl<'de> Deserialize<'de> for FileKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        expect_tag(deserializer, FILE_TYPE).map(|()| FileKind)
    }
}

/// The `"type": "directory"` tag of [`LibraryDirectoryInfo`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirectoryKind;

impl Serialize for DirectoryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(DIRECTORY_TYPE)
    }
}

impl<'de> Deserialize<'de> for DirectoryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        expect_tag(deserializer, DIRECTORY_TYPE).map(|()| DirectoryKind)
    }
}

/// Fields shared by every library item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperties {
    /// Item identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Storage partition.
    pub partition_id: Uuid,
    /// Path relative to the library root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_path: Option<CloudPath>,
    /// Path including the library location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<CloudPath>,
    /// Creation time.
    pub created_on: DateTime<Utc>,
    /// Last access time.
    pub last_accessed_on: DateTime<Utc>,
    /// Last modification time.
    pub last_modified_on: DateTime<Utc>,
    /// Item name.
    pub name: String,
    /// Containing directory, absent for top-level items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_directory_id: Option<Uuid>,
    /// Attribute flags, e.g. `"Hidden, ReadOnly"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
}

/// A file in a library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFileInfo {
    /// Discriminator, always `"file"`.
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Shared item fields.
    #[serde(flatten)]
    pub properties: ItemProperties,
    /// Size in bytes.
    #[serde(default)]
    pub length: i64,
    /// MIME type of the content.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Whether the file points at another file.
    #[serde(default)]
    pub is_shortcut: bool,
    /// Caller-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_id: Option<String>,
    /// Keys not mapped to a known field.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

/// A directory in a library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDirectoryInfo {
    /// Discriminator, always `"directory"`.
    #[serde(rename = "type")]
    pub kind: DirectoryKind,
    /// Shared item fields.
    #[serde(flatten)]
    pub properties: ItemProperties,
    /// Whether the directory has any children.
    #[serde(default)]
    pub has_children: bool,
    /// Keys not mapped to a known field.
    #[serde(flatten)]
    pub extension: Map<String, Value>,
}

/// A file or a directory.
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryItemInfo {
    /// `"type": "file"`
    File(LibraryFileInfo),
    /// `"type": "directory"`
    Directory(LibraryDirectoryInfo),
}

impl LibraryItemInfo {
    /// The discriminator written for this item.
    pub fn item_type(&self) -> &'static str {
        match self {
            LibraryItemInfo::File(_) => FILE_TYPE,
            LibraryItemInfo::Directory(_) => DIRECTORY_TYPE,
        }
    }

    /// Shared item fields.
    pub fn properties(&self) -> &ItemProperties {
        match self {
            LibraryItemInfo::File(file) => &file.properties,
            LibraryItemInfo::Directory(dir) => &dir.properties,
        }
    }

    /// Unmapped keys captured on decode.
    pub fn extension(&self) -> &Map<String, Value> {
        match self {
            LibraryItemInfo::File(file) => &file.extension,
            LibraryItemInfo::Directory(dir) => &dir.extension,
        }
    }

    /// Item identifier.
    pub fn id(&self) -> Uuid {
        self.properties().id
    }

    /// Item name.
    pub fn name(&self) -> &str {
        &self.properties().name
    }

    /// Returns the file, if this is one.
    pub fn as_file(&self) -> Option<&LibraryFileInfo> {
        match self {
            LibraryItemInfo::File(file) => Some(file),
            LibraryItemInfo::Directory(_) => None,
        }
    }

    /// Returns the directory, if this is one.
    pub fn as_directory(&self) -> Option<&LibraryDirectoryInfo> {
        match self {
            LibraryItemInfo::Directory(dir) => Some(dir),
            LibraryItemInfo::File(_) => None,
        }
    }

    /// Returns true for files.
    pub fn is_file(&self) -> bool {
        matches!(self, LibraryItemInfo::File(_))
    }

    /// Returns true for directories.
    pub fn is_directory(&self) -> bool {
        matches!(self, LibraryItemInfo::Directory(_))
    }
}

impl From<LibraryFileInfo> for LibraryItemInfo {
    fn from(file: LibraryFileInfo) -> Self {
        LibraryItemInfo::File(file)
    }
}

impl From<LibraryDirectoryInfo> for LibraryItemInfo {
    fn from(dir: LibraryDirectoryInfo) -> Self {
        LibraryItemInfo::Directory(dir)
    }
}

impl Serialize for LibraryItemInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LibraryItemInfo::File(file) => file.serialize(serializer),
            LibraryItemInfo::Directory(dir) => dir.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for LibraryItemInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;

        let item_type = match object.get(TYPE_FIELD) {
            Some(Value::String(item_type)) => item_type.clone(),
            Some(other) => {
                return Err(D::Error::custom(UnknownDiscriminatorError {
                    found: Some(other.to_string()),
                }))
            }
            None => return Err(D::Error::custom(UnknownDiscriminatorError { found: None })),
        };

        let body = Value::Object(object);
        match item_type.as_str() {
            FILE_TYPE => LibraryFileInfo::deserialize(body)
                .map(LibraryItemInfo::File)
                .map_err(D::Error::custom),
            DIRECTORY_TYPE => LibraryDirectoryInfo::deserialize(body)
                .map(LibraryItemInfo::Directory)
                .map_err(D::Error::custom),
            _ => Err(D::Error::custom(UnknownDiscriminatorError {
                found: Some(item_type),
            })),
        }
    }
}
