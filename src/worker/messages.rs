//! Request and response protocol between the state machine and the remote worker.
//!
//! The state machine never awaits anything itself. It emits a [`RemoteRequest`]
//! and later receives the matching [`RemoteResponse`] as an ordinary event, so
//! every remote effect is applied on the single thread that owns the state.

use crate::domain::{CatalogError, Item, ItemDraft, ItemId, StoreOperation};
use crate::remote::SearchResponse;

/// Work for the remote worker.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRequest {
    /// Fetch the whole collection.
    ListItems,

    /// Create an item from a draft that already passed client-side validation.
    CreateItem { draft: ItemDraft },

    /// Replace an existing item's fields.
    UpdateItem { id: ItemId, draft: ItemDraft },

    /// Delete an item.
    DeleteItem { id: ItemId },

    /// Ask the ranking endpoint for matches.
    Search {
        /// Session sequence number the response is stamped with.
        seq: u64,

        /// Trimmed query text.
        query: String,

        /// Optional view context used to narrow relevance.
        section: Option<String>,
    },
}

impl RemoteRequest {
    /// Short name used in span fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ListItems => "list_items",
            Self::CreateItem { .. } => "create_item",
            Self::UpdateItem { .. } => "update_item",
            Self::DeleteItem { .. } => "delete_item",
            Self::Search { .. } => "search",
        }
    }
}

/// Outcome of a [`RemoteRequest`], fed back to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteResponse {
    /// The collection was fetched.
    ItemsListed { items: Vec<Item> },

    /// An item was created; `item` is the server's record.
    ItemCreated { item: Item },

    /// An item was updated.
    ItemUpdated {
        /// Identifier the update was addressed to.
        id: ItemId,

        /// The server's record after the update.
        item: Item,

        /// Whether the payload was degraded and the collection should be reloaded.
        refresh: bool,
    },

    /// An item was deleted.
    ItemDeleted { id: ItemId },

    /// An item store operation failed.
    StoreFailed {
        op: StoreOperation,
        error: CatalogError,
    },

    /// The ranking endpoint answered.
    SearchCompleted { seq: u64, response: SearchResponse },

    /// The ranking request failed.
    SearchFailed { seq: u64, error: CatalogError },
}
