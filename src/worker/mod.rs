//! Remote worker for asynchronous store and search operations.
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol between the state machine and the worker
//! - `handler`: Worker implementation executing requests on tokio tasks

pub mod handler;
pub mod messages;

pub use handler::RemoteWorker;
pub use messages::{RemoteRequest, RemoteResponse};
