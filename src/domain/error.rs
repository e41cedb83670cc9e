//! Error types for the catalog client.
//!
//! This module defines the centralized error type [`CatalogError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.
//!
//! Errors never escape a component boundary: the item store and the search session
//! convert them into a single human-readable message stored in their own state.
//! The two `*_message` methods below are that conversion.

use thiserror::Error;

/// Message shown by the item store when the bearer credential is absent.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login to continue";

/// Message shown by the search session when the bearer credential is absent.
pub const SEARCH_LOGIN_REQUIRED_MESSAGE: &str = "Please login to use semantic search.";

/// Message shown by the search session for any unstructured failure.
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to fetch search results";

/// The item-store operation an error is reported against.
///
/// Each operation has its own fallback message used when the failure carries no
/// usable text of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    List,
    Create,
    Update,
    Delete,
}

impl StoreOperation {
    /// Default message recorded when a failure has nothing more specific to say.
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::List => "Failed to fetch items",
            Self::Create => "Failed to create item",
            Self::Update => "Failed to update item",
            Self::Delete => "Failed to delete item",
        }
    }

    /// Short lowercase name used in tracing fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// The main error type for catalog operations.
///
/// Variants carry owned strings rather than source errors so that failures can be
/// cloned into worker responses and compared in tests.
///
/// # Examples
///
/// ```
/// use brainbox::domain::{CatalogError, StoreOperation};
///
/// let err = CatalogError::Remote { status: Some(400), message: "Title is required".into() };
/// assert_eq!(err.store_message(StoreOperation::Create), "Title is required");
///
/// let err = CatalogError::AuthorizationMissing;
/// assert_eq!(err.store_message(StoreOperation::List), "Please login to continue");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// No bearer credential was available for a protected path.
    ///
    /// Detected before the request is built; the network is never touched.
    #[error("Authorization token missing")]
    AuthorizationMissing,

    /// The remote store answered with a failure envelope carrying a message.
    #[error("Remote error ({status:?}): {message}")]
    Remote {
        /// HTTP status code, when the failure came from an HTTP response.
        status: Option<u16>,
        /// The `message` field of the failure envelope, verbatim.
        message: String,
    },

    /// The request failed without a structured message (connection refused,
    /// non-success status with an unrecognized body, and so on).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A successful response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A draft was rejected client-side before being sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A secondary filter was requested that does not fit the primary filter.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl CatalogError {
    /// Converts the error into the message recorded by the item store.
    ///
    /// Authorization failures get a fixed instructional message, remote failure
    /// envelopes are surfaced verbatim, and everything else surfaces its own
    /// description or the operation's default when that description is empty.
    #[must_use]
    pub fn store_message(&self, op: StoreOperation) -> String {
        match self {
            Self::AuthorizationMissing => LOGIN_REQUIRED_MESSAGE.to_string(),
            Self::Remote { message, .. }
            | Self::Transport(message)
            | Self::Decode(message)
            | Self::Validation(message)
            | Self::InvalidFilter(message)
            | Self::Config(message)
            | Self::Io(message) => {
                if message.trim().is_empty() {
                    op.fallback_message().to_string()
                } else {
                    message.clone()
                }
            }
        }
    }

    /// Converts the error into the message recorded by the search session.
    ///
    /// Only structured remote failures keep their own text; anything that is not
    /// an authorization problem collapses into a generic failure message.
    #[must_use]
    pub fn search_message(&self) -> String {
        match self {
            Self::AuthorizationMissing => SEARCH_LOGIN_REQUIRED_MESSAGE.to_string(),
            Self::Remote { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => SEARCH_FAILED_MESSAGE.to_string(),
        }
    }
}

/// A specialized `Result` type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
