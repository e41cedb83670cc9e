//! Remote store access.
//!
//! Everything that crosses the network lives here: the [`RemoteStore`] trait,
//! its HTTP implementation, bearer credential sources and the wire models that
//! keep response shape quirks out of the domain layer.

pub mod backend;
pub mod credentials;
pub mod http;
pub mod models;

pub use backend::RemoteStore;
pub use credentials::{ChainedTokens, FileToken, StaticToken, TokenSource};
pub use http::HttpRemote;
pub use models::{ItemPayload, SearchHit, SearchRequest, SearchResponse};
