//! Item domain model and drafts.
//!
//! An [`Item`] is one stored content record. Its [`ItemType`] is fixed at creation
//! and decides which payload field is meaningful: `content` for notes, `url` for
//! links and videos, `file_path` for documents. The other payload fields may be
//! present on the wire but are ignored by every accessor in this crate.
//!
//! An [`ItemDraft`] is what the user submits for create and update; the remote
//! store is the source of truth for identifiers and derived fields, so a draft
//! never carries an id.

use crate::domain::error::{CatalogError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Opaque, stable identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The four kinds of content an item can hold.
///
/// Declared in alphabetical order so that the derived `Ord` matches the order
/// navigation counts are presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Document,
    Link,
    Note,
    Video,
}

impl ItemType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Link => "link",
            Self::Note => "note",
            Self::Video => "video",
        }
    }

    /// Whether items of this type can be narrowed by a secondary filter.
    #[must_use]
    pub const fn has_sub_categories(self) -> bool {
        matches!(self, Self::Link | Self::Document)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" => Ok(Self::Document),
            "link" => Ok(Self::Link),
            "note" => Ok(Self::Note),
            "video" => Ok(Self::Video),
            other => Err(CatalogError::Validation(format!("unknown item type: {other}"))),
        }
    }
}

/// A stored content record, as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ItemId,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "type")]
    pub kind: ItemType,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Server-side reference to an uploaded document.
    #[serde(default, rename = "filePath", skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Sub-category stored by the server (domain for links, extension for
    /// documents). Takes precedence over anything derived locally.
    #[serde(default, rename = "categorySub", skip_serializing_if = "Option::is_none")]
    pub category_sub: Option<String>,

    #[serde(
        default,
        rename = "createdAt",
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Creates an item with only the fields every type shares.
    ///
    /// Mostly useful for fixtures; real items come from the remote store.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, kind: ItemType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            tags: Vec::new(),
            content: None,
            url: None,
            file_path: None,
            category_sub: None,
            created_at: None,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_category_sub(mut self, sub: impl Into<String>) -> Self {
        self.category_sub = Some(sub.into());
        self
    }

    /// Note body, only for notes.
    #[must_use]
    pub fn note_content(&self) -> Option<&str> {
        match self.kind {
            ItemType::Note => self.content.as_deref(),
            _ => None,
        }
    }

    /// Target URL, only for links and videos.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        match self.kind {
            ItemType::Link | ItemType::Video => self.url.as_deref(),
            _ => None,
        }
    }

    /// Uploaded file reference, only for documents.
    #[must_use]
    pub fn file_reference(&self) -> Option<&str> {
        match self.kind {
            ItemType::Document => self.file_path.as_deref().filter(|p| !p.is_empty()),
            _ => None,
        }
    }
}

fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

/// A file selected for upload with a document item.
#[derive(Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).map(String::from);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads a file from disk into an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, or
    /// [`CatalogError::Validation`] if the path has no file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CatalogError::Validation(format!("not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path)?;
        Ok(Self::new(file_name, bytes))
    }
}

impl fmt::Debug for FileAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAttachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// User-submitted fields for creating or updating an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub title: String,
    pub kind: ItemType,
    pub tags: Vec<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub file: Option<FileAttachment>,
}

impl ItemDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, kind: ItemType) -> Self {
        Self {
            title: title.into(),
            kind,
            tags: Vec::new(),
            content: None,
            url: None,
            file: None,
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: FileAttachment) -> Self {
        self.file = Some(file);
        self
    }

    /// Checks the draft before it is sent as a new item.
    ///
    /// A document must come with a file; the store never records a document
    /// whose file reference would be empty.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] for an empty title or a document
    /// without an attached file.
    pub fn validate_for_create(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::Validation("title is required".to_string()));
        }
        if self.kind == ItemType::Document && self.file.is_none() {
            return Err(CatalogError::Validation("no file uploaded".to_string()));
        }
        Ok(())
    }
}

/// Splits a comma separated tag input into trimmed, non-empty tags.
///
/// ```
/// use brainbox::domain::parse_tags;
///
/// assert_eq!(parse_tags("work, personal,,  urgent "), vec!["work", "personal", "urgent"]);
/// assert!(parse_tags("  ").is_empty());
/// ```
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_item() {
        let json = serde_json::json!({
            "_id": "66b1",
            "title": "Rust book",
            "type": "link",
            "tags": ["rust"],
            "url": "https://doc.rust-lang.org/book/",
            "createdAt": "2024-05-01T10:00:00.000Z"
        });
        let item: Item = serde_json::from_value(json).unwrap();
        assert_eq!(item.id.as_str(), "66b1");
        assert_eq!(item.kind, ItemType::Link);
        assert_eq!(item.target_url(), Some("https://doc.rust-lang.org/book/"));
        assert!(item.created_at.is_some());
    }

    #[test]
    fn unparseable_timestamp_is_dropped_not_fatal() {
        let json = serde_json::json!({"_id": "1", "title": "t", "type": "note", "createdAt": 12});
        let item: Item = serde_json::from_value(json).unwrap();
        assert!(item.created_at.is_none());
    }

    #[test]
    fn payload_fields_follow_type() {
        let note = Item::new("1", "n", ItemType::Note)
            .with_content("body")
            .with_url("https://ignored.example");
        assert_eq!(note.note_content(), Some("body"));
        assert_eq!(note.target_url(), None);

        let doc = Item::new("2", "d", ItemType::Document).with_file_path("");
        assert_eq!(doc.file_reference(), None);
    }

    #[test]
    fn document_without_file_is_rejected() {
        let draft = ItemDraft::new("Scan", ItemType::Document);
        assert_eq!(
            draft.validate_for_create(),
            Err(CatalogError::Validation("no file uploaded".to_string()))
        );

        let draft = draft.with_file(FileAttachment::new("scan.pdf", vec![1, 2, 3]));
        assert!(draft.validate_for_create().is_ok());
    }

    #[test]
    fn attachment_guesses_content_type() {
        let file = FileAttachment::new("Report.PDF", vec![]);
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(FileAttachment::new("blob", vec![]).content_type, None);
    }

    #[test]
    fn item_type_parses_case_insensitively() {
        assert_eq!("Video".parse::<ItemType>(), Ok(ItemType::Video));
        assert!("image".parse::<ItemType>().is_err());
    }
}
