//! Remote worker executing [`RemoteRequest`]s.
//!
//! Each request runs on its own tokio task so that overlapping operations make
//! progress independently. Results come back over an unbounded channel in
//! completion order, which is not necessarily dispatch order.

use crate::domain::error::Result;
use crate::domain::StoreOperation;
use crate::remote::models::{ItemPayload, SearchRequest};
use crate::remote::RemoteStore;
use crate::worker::{RemoteRequest, RemoteResponse};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::Instrument;

/// Executes remote requests against a [`RemoteStore`].
#[derive(Clone)]
pub struct RemoteWorker {
    remote: Arc<dyn RemoteStore>,
}

impl RemoteWorker {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }

    /// Folds a store result into a response, logging the outcome.
    fn store_result<T, F>(op: StoreOperation, result: Result<T>, on_success: F) -> RemoteResponse
    where
        F: FnOnce(T) -> RemoteResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation = op.as_str(), "remote operation successful");
                on_success(value)
            }
            Err(error) => {
                tracing::debug!(operation = op.as_str(), error = %error, "remote operation failed");
                RemoteResponse::StoreFailed { op, error }
            }
        }
    }

    /// Performs one request and returns its response.
    ///
    /// Never fails: every error is folded into the response so the state
    /// machine can record it.
    pub async fn handle_request(&self, request: RemoteRequest) -> RemoteResponse {
        match request {
            RemoteRequest::ListItems => {
                Self::store_result(StoreOperation::List, self.remote.list_items().await, |items| {
                    tracing::debug!(item_count = items.len(), "items listed");
                    RemoteResponse::ItemsListed { items }
                })
            }

            RemoteRequest::CreateItem { draft } => {
                let payload = ItemPayload::from_draft(&draft);
                Self::store_result(
                    StoreOperation::Create,
                    self.remote.create_item(payload).await,
                    |item| RemoteResponse::ItemCreated { item },
                )
            }

            RemoteRequest::UpdateItem { id, draft } => {
                let refresh = ItemPayload::is_degraded_form(&draft);
                let payload = ItemPayload::from_draft(&draft);
                let result = self.remote.update_item(&id, payload).await;
                Self::store_result(StoreOperation::Update, result, |item| {
                    RemoteResponse::ItemUpdated { id, item, refresh }
                })
            }

            RemoteRequest::DeleteItem { id } => Self::store_result(
                StoreOperation::Delete,
                self.remote.delete_item(&id).await,
                |()| RemoteResponse::ItemDeleted { id },
            ),

            RemoteRequest::Search { seq, query, section } => {
                let request = SearchRequest { query, section };
                match self.remote.search(request).await {
                    Ok(response) => {
                        tracing::debug!(
                            seq = seq,
                            hits = response.results.len(),
                            "search answered"
                        );
                        RemoteResponse::SearchCompleted { seq, response }
                    }
                    Err(error) => {
                        tracing::debug!(seq = seq, error = %error, "search failed");
                        RemoteResponse::SearchFailed { seq, error }
                    }
                }
            }
        }
    }

    /// Runs a request on a new task and sends its response to `tx`.
    ///
    /// A closed receiver means the client is gone; the response is dropped.
    pub fn spawn(&self, request: RemoteRequest, tx: UnboundedSender<RemoteResponse>) {
        let worker = self.clone();
        let span = tracing::debug_span!("remote_request", kind = request.kind());
        tokio::spawn(
            async move {
                let response = worker.handle_request(request).await;
                if tx.send(response).is_err() {
                    tracing::debug!("response receiver dropped");
                }
            }
            .instrument(span),
        );
    }
}

impl std::fmt::Debug for RemoteWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteWorker").finish_non_exhaustive()
    }
}
