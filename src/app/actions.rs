//! Actions representing side effects to be executed by the client runtime.
//!
//! The event handler never performs I/O. It returns a `Vec<Action>` after each
//! event and the runtime executes them in order: remote requests are handed to
//! the worker, activity changes are published to observers.

use crate::worker::RemoteRequest;

/// Commands produced by the event handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Hands a request to the remote worker.
    ///
    /// The response arrives later as
    /// [`Event::RemoteResponse`](crate::app::Event::RemoteResponse).
    Dispatch(RemoteRequest),

    /// The search session became active (`true`) or inactive (`false`).
    ///
    /// Only emitted on an actual change.
    SearchActivity(bool),
}
