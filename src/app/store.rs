//! Item store: the canonical in-memory collection.
//!
//! The store mirrors the remote collection and never changes it speculatively.
//! Each operation has three phases: `begin` when the request is dispatched,
//! then either an `apply_*` transform or `fail` when the response arrives.
//! Operations are not serialized, so the store counts outstanding requests and
//! reports itself as loading while any of them is still open.
//!
//! Results are applied by identifier, never by request order. The final
//! collection therefore reflects whichever response for a given id resolved
//! last, and a failed operation leaves the collection untouched.

use crate::domain::{CatalogError, Item, ItemId, StoreOperation};

/// Canonical item collection with loading and last-error state.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    pending: usize,
    error: Option<String>,
}

impl ItemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in display order: most recent creation first, server order otherwise.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether any store operation is still awaiting its response.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// Human-readable message from the last failed operation.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Marks an operation as dispatched.
    pub fn begin(&mut self, op: StoreOperation) {
        self.pending += 1;
        self.error = None;
        tracing::debug!(operation = op.as_str(), pending = self.pending, "store operation started");
    }

    fn finish(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    /// Replaces the whole collection with a freshly listed one.
    pub fn apply_list(&mut self, items: Vec<Item>) {
        self.finish();
        self.error = None;
        tracing::debug!(item_count = items.len(), "collection replaced");
        self.items = items;
    }

    /// Puts a created item at the front of the collection.
    ///
    /// A stale copy with the same identifier (from a list that raced the
    /// create) is dropped first so identifiers stay unique.
    pub fn apply_created(&mut self, item: Item) {
        self.finish();
        self.items.retain(|existing| existing.id != item.id);
        tracing::debug!(item_id = %item.id, "item created");
        self.items.insert(0, item);
    }

    /// Replaces the item with the given identifier in place.
    ///
    /// Returns `false` when no such item is held; the response is then accepted
    /// but not reflected.
    pub fn apply_updated(&mut self, id: &ItemId, item: Item) -> bool {
        self.finish();
        match self.items.iter_mut().find(|existing| &existing.id == id) {
            Some(slot) => {
                tracing::debug!(item_id = %id, "item updated");
                *slot = item;
                true
            }
            None => {
                tracing::warn!(item_id = %id, "cache miss: updated item not in collection");
                false
            }
        }
    }

    /// Removes the item with the given identifier.
    pub fn apply_deleted(&mut self, id: &ItemId) {
        self.finish();
        let before = self.items.len();
        self.items.retain(|existing| &existing.id != id);
        if self.items.len() == before {
            tracing::debug!(item_id = %id, "deleted item was not in collection");
        }
    }

    /// Records a failed operation. The collection is left unchanged.
    pub fn fail(&mut self, op: StoreOperation, error: &CatalogError) {
        self.finish();
        self.reject(op, error);
    }

    /// Records an error for an operation that was refused before dispatch.
    pub fn reject(&mut self, op: StoreOperation, error: &CatalogError) {
        let message = error.store_message(op);
        tracing::debug!(
            operation = op.as_str(),
            error = %error,
            message = %message,
            "store operation failed"
        );
        self.error = Some(message);
    }
}
