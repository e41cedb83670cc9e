//! Remote store abstraction.
//!
//! This module defines the [`RemoteStore`] trait that abstracts over the service
//! holding the authoritative collection and its ranking endpoint. The worker only
//! talks to this trait, so tests can substitute an in-process double for the
//! HTTP implementation.
//!
//! The trait is minimal and maps one method to one round trip. None of the
//! methods retry; a failure is reported once and the user re-triggers.

use crate::domain::error::Result;
use crate::domain::{Item, ItemId};
use crate::remote::models::{ItemPayload, SearchRequest, SearchResponse};
use async_trait::async_trait;

/// Abstraction over the remote persistence and search service.
///
/// # Implementations
///
/// - [`HttpRemote`](crate::remote::HttpRemote): REST over `reqwest` (default)
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches the full collection, already normalized to a list.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is missing or the request fails.
    async fn list_items(&self) -> Result<Vec<Item>>;

    /// Creates an item and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is missing or the request fails.
    async fn create_item(&self, payload: ItemPayload) -> Result<Item>;

    /// Replaces an item's fields and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is missing or the request fails.
    async fn update_item(&self, id: &ItemId, payload: ItemPayload) -> Result<Item>;

    /// Deletes an item. No response body is required.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is missing or the request fails.
    async fn delete_item(&self, id: &ItemId) -> Result<()>;

    /// Asks the ranking endpoint for items matching a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is missing or the request fails.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse>;
}
