//! Wire models for the remote store.
//!
//! These types are separate from the domain models so that response shape
//! quirks stop at the remote boundary. Every decoder here is total: an
//! unrecognized shape becomes an empty result, never an error.

use crate::domain::{FileAttachment, Item, ItemDraft, ItemId, ItemType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Multipart part name the remote store expects uploaded documents under.
pub const FILE_PART_NAME: &str = "pdf";

/// Plain item fields, sent as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFields {
    pub title: String,

    #[serde(rename = "type")]
    pub kind: ItemType,

    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ItemFields {
    /// Keeps only the payload field that is meaningful for the draft's type.
    fn from_draft(draft: &ItemDraft) -> Self {
        let (content, url) = match draft.kind {
            ItemType::Note => (draft.content.clone(), None),
            ItemType::Link | ItemType::Video => (None, draft.url.clone()),
            ItemType::Document => (None, None),
        };
        Self {
            title: draft.title.clone(),
            kind: draft.kind,
            tags: draft.tags.clone(),
            content,
            url,
        }
    }

    /// Flattens the fields into multipart text parts.
    ///
    /// Tags travel as a single comma joined value in multipart bodies.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("type", self.kind.as_str().to_string()),
            ("tags", self.tags.join(",")),
        ];
        if let Some(content) = &self.content {
            fields.push(("content", content.clone()));
        }
        if let Some(url) = &self.url {
            fields.push(("url", url.clone()));
        }
        fields
    }
}

/// Request body for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPayload {
    /// JSON object with plain fields.
    Fields(ItemFields),
    /// Multipart form with plain fields plus the uploaded file.
    Multipart {
        fields: ItemFields,
        file: FileAttachment,
    },
}

impl ItemPayload {
    /// Builds the payload for a draft: multipart when a file is attached,
    /// plain fields otherwise.
    #[must_use]
    pub fn from_draft(draft: &ItemDraft) -> Self {
        let fields = ItemFields::from_draft(draft);
        match (&draft.kind, &draft.file) {
            (ItemType::Document, Some(file)) => Self::Multipart {
                fields,
                file: file.clone(),
            },
            _ => Self::Fields(fields),
        }
    }

    /// Whether this payload was degraded from a form shape to plain fields.
    ///
    /// A document edited without a new file loses its upload and is sent as a
    /// plain object; the server may recompute derived fields, so the caller
    /// should reload the collection once the update lands.
    #[must_use]
    pub fn is_degraded_form(draft: &ItemDraft) -> bool {
        draft.kind == ItemType::Document && draft.file.is_none()
    }
}

/// Normalizes a `GET /items` body into a list of items.
///
/// Accepts a bare array or an object with a nested `data` array. Anything else
/// is an empty collection. Elements that fail to decode are skipped.
#[must_use]
pub fn decode_item_list(body: Value) -> Vec<Item> {
    let elements = match body {
        Value::Array(elements) => elements,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(elements)) => elements,
            _ => {
                tracing::debug!("list response has no data array, treating as empty");
                Vec::new()
            }
        },
        _ => {
            tracing::debug!("unrecognized list response shape, treating as empty");
            Vec::new()
        }
    };

    let total = elements.len();
    let items: Vec<Item> = elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value::<Item>(element) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable item");
                None
            }
        })
        .collect();

    tracing::debug!(received = total, decoded = items.len(), "item list decoded");
    items
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

/// One ranked hit from the remote search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: ItemId,
    pub similarity: Option<f64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

impl SearchHit {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, similarity: Option<f64>) -> Self {
        Self {
            id: id.into(),
            similarity,
            title: None,
            url: None,
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        let id = match value.get("_id")? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let similarity = value.get("similarity").and_then(|s| match s {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(String::from);
        let tags = value
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| match t {
                        Value::String(s) => Some(s.clone()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            id: ItemId::new(id),
            similarity,
            title: text("title"),
            url: text("url"),
            tags,
        })
    }
}

/// Decoded `POST /search` response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    /// Hits in the order the remote store returned them.
    pub results: Vec<SearchHit>,
    /// Ranking strategy reported by the remote store. Its presence means the
    /// remote ordering is final.
    pub search_type: Option<String>,
}

impl SearchResponse {
    #[must_use]
    pub fn new(results: Vec<SearchHit>, search_type: Option<String>) -> Self {
        Self { results, search_type }
    }

    /// Decodes a response body. A missing or non-array `results` field yields
    /// no hits; hits without an `_id` are dropped.
    #[must_use]
    pub fn decode(body: &Value) -> Self {
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .map(|hits| hits.iter().filter_map(SearchHit::from_value).collect())
            .unwrap_or_default();
        let search_type = body
            .get("searchType")
            .and_then(Value::as_str)
            .map(String::from);
        Self { results, search_type }
    }
}

/// Failure envelope returned by the remote store.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_accepts_bare_array_and_envelope() {
        let item = json!({"_id": "1", "title": "a", "type": "note"});
        assert_eq!(decode_item_list(json!([item.clone()])).len(), 1);
        assert_eq!(decode_item_list(json!({"data": [item]})).len(), 1);
    }

    #[test]
    fn list_unrecognized_shapes_are_empty() {
        assert!(decode_item_list(json!({"items": []})).is_empty());
        assert!(decode_item_list(json!({"data": {"nested": true}})).is_empty());
        assert!(decode_item_list(json!("oops")).is_empty());
        assert!(decode_item_list(Value::Null).is_empty());
    }

    #[test]
    fn list_skips_bad_elements() {
        let body = json!([
            {"_id": "1", "title": "ok", "type": "note"},
            {"title": "no id", "type": "note"},
            {"_id": "3", "title": "bad type", "type": "image"}
        ]);
        let items = decode_item_list(body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "1");
    }

    #[test]
    fn search_response_decodes_leniently() {
        let body = json!({
            "results": [
                {"_id": "a", "similarity": 0.91, "title": "Alpha", "tags": ["x"]},
                {"_id": "b", "similarity": "0.4"},
                {"similarity": 0.99},
                {"_id": 7}
            ],
            "searchType": "semantic"
        });
        let response = SearchResponse::decode(&body);
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.results[0].similarity, Some(0.91));
        assert_eq!(response.results[1].similarity, Some(0.4));
        assert_eq!(response.results[2].id.as_str(), "7");
        assert_eq!(response.search_type.as_deref(), Some("semantic"));

        assert_eq!(SearchResponse::decode(&json!({"results": null})), SearchResponse::default());
    }

    #[test]
    fn fields_keep_only_meaningful_payload() {
        let draft = ItemDraft::new("Clip", ItemType::Video)
            .with_url("https://youtu.be/abc")
            .with_content("ignored");
        let ItemPayload::Fields(fields) = ItemPayload::from_draft(&draft) else {
            panic!("video drafts are plain fields");
        };
        assert_eq!(fields.url.as_deref(), Some("https://youtu.be/abc"));
        assert_eq!(fields.content, None);
    }

    #[test]
    fn document_with_file_is_multipart() {
        let draft = ItemDraft::new("Paper", ItemType::Document)
            .with_tags(["ml", "papers"])
            .with_file(FileAttachment::new("paper.pdf", b"%PDF".to_vec()));
        match ItemPayload::from_draft(&draft) {
            ItemPayload::Multipart { fields, file } => {
                assert_eq!(file.file_name, "paper.pdf");
                assert!(fields.form_fields().contains(&("tags", "ml,papers".to_string())));
            }
            ItemPayload::Fields(_) => panic!("expected multipart"),
        }
        assert!(!ItemPayload::is_degraded_form(&draft));
        assert!(ItemPayload::is_degraded_form(&ItemDraft::new("Paper", ItemType::Document)));
    }
}
