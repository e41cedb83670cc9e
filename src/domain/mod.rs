//! Domain layer for the catalog client.
//!
//! This module contains the core domain types, independent of the transport used
//! to reach the remote store or of how results are displayed.
//!
//! # Organization
//!
//! - [`error`]: Error types, result alias and user-facing error messages
//! - [`item`]: Item model, item types and create/update drafts

pub mod error;
pub mod item;

pub use error::{CatalogError, Result, StoreOperation};
pub use item::{parse_tags, FileAttachment, Item, ItemDraft, ItemId, ItemType};
