//! Async runtime around the catalog state machine.
//!
//! [`CatalogClient`] owns the [`AppState`] and plays the role of the event
//! loop: it feeds events to [`handle_event`], executes the returned actions,
//! and turns every remote response back into an event.
//!
//! ```text
//! send(Event) ─▶ handle_event ─▶ Action::Dispatch ─▶ RemoteWorker::spawn ─┐
//!      ▲                        Action::SearchActivity ─▶ watch channel   │
//!      │                                                                  │
//!      └──────── next_response() ◀── mpsc ◀── RemoteResponse ◀────────────┘
//! ```
//!
//! Requests overlap freely; responses are applied in completion order, which
//! is why the search session stamps its requests with sequence numbers.

use crate::app::{handle_event, Action, AppState, Event};
use crate::domain::Result;
use crate::remote::{HttpRemote, RemoteStore};
use crate::worker::{RemoteResponse, RemoteWorker};
use crate::{initialize, Config};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Event loop driving one catalog session.
///
/// Must be used from within a tokio runtime: dispatching a request spawns a
/// task.
pub struct CatalogClient {
    state: AppState,
    worker: RemoteWorker,
    tx: mpsc::UnboundedSender<RemoteResponse>,
    rx: mpsc::UnboundedReceiver<RemoteResponse>,
    in_flight: usize,
    activity: watch::Sender<bool>,
}

impl CatalogClient {
    #[must_use]
    pub fn new(state: AppState, remote: Arc<dyn RemoteStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (activity, _) = watch::channel(state.search.is_active());
        Self {
            state,
            worker: RemoteWorker::new(remote),
            tx,
            rx,
            in_flight: 0,
            activity,
        }
    }

    /// Builds a client talking HTTP to the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Config`](crate::domain::CatalogError::Config) if
    /// the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote = HttpRemote::new(config.api_base(), config.token_source(), config.timeout())?;
        Ok(Self::new(initialize(config), Arc::new(remote)))
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Number of dispatched requests whose response has not been applied yet.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Observes whether a search currently owns the display.
    ///
    /// The value flips to `true` when ranked or fallback results arrive and
    /// back to `false` on clear, on an empty or failed search, and on a new
    /// submission.
    #[must_use]
    pub fn search_activity(&self) -> watch::Receiver<bool> {
        self.activity.subscribe()
    }

    /// Handles one event and executes its actions.
    ///
    /// Returns whether the state visibly changed.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`handle_event`]; the state is unchanged in
    /// that case.
    pub fn send(&mut self, event: Event) -> Result<bool> {
        let (changed, actions) = handle_event(&mut self.state, &event)?;
        tracing::debug!(action_count = actions.len(), changed = changed, "event handled");
        for action in actions {
            self.execute_action(action);
        }
        Ok(changed)
    }

    fn execute_action(&mut self, action: Action) {
        match action {
            Action::Dispatch(request) => {
                tracing::debug!(
                    request = request.kind(),
                    in_flight = self.in_flight + 1,
                    "dispatching request"
                );
                self.in_flight += 1;
                self.worker.spawn(request, self.tx.clone());
            }
            Action::SearchActivity(active) => {
                tracing::debug!(active = active, "search activity changed");
                self.activity.send_replace(active);
            }
        }
    }

    /// Waits for the next remote response and applies it.
    ///
    /// Returns `None` when nothing is in flight, otherwise whether the state
    /// visibly changed.
    pub async fn next_response(&mut self) -> Option<bool> {
        if self.in_flight == 0 {
            return None;
        }
        let response = self.rx.recv().await?;
        self.in_flight -= 1;

        match self.send(Event::RemoteResponse(response)) {
            Ok(changed) => Some(changed),
            Err(e) => {
                tracing::warn!(error = %e, "remote response rejected");
                Some(false)
            }
        }
    }

    /// Applies responses until nothing is in flight, including follow-up
    /// requests dispatched along the way.
    pub async fn settle(&mut self) {
        while self.next_response().await.is_some() {}
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("in_flight", &self.in_flight)
            .field("search_active", &*self.activity.borrow())
            .finish_non_exhaustive()
    }
}
