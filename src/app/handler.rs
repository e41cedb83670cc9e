//! Event handling and state transition logic.
//!
//! This module implements the event handler that processes user intents and
//! remote responses, translating them into state changes and action
//! sequences.
//!
//! # Architecture
//!
//! The handler follows a unidirectional data flow pattern:
//! 1. Events arrive from the caller or, wrapped, from the remote worker
//! 2. [`handle_event`] pattern-matches the event type
//! 3. State mutations occur through the components held by `AppState`
//! 4. Pagination is reconciled and actions are returned for execution
//!
//! The handler never awaits. A user intent that needs the remote store marks
//! the affected component as loading and returns an [`Action::Dispatch`]; the
//! outcome comes back later as [`Event::RemoteResponse`].
//!
//! # Example
//!
//! ```
//! use brainbox::app::{handle_event, Action, AppState, Event};
//!
//! let mut state = AppState::default();
//! let (changed, actions) = handle_event(&mut state, &Event::Refresh)?;
//! assert!(changed && state.store.is_loading());
//! assert!(matches!(actions[0], Action::Dispatch(_)));
//! # Ok::<(), brainbox::domain::CatalogError>(())
//! ```

use crate::app::{Action, AppState};
use crate::domain::error::Result;
use crate::domain::{ItemDraft, ItemId, ItemType, StoreOperation};
use crate::worker::{RemoteRequest, RemoteResponse};

/// User intents and remote responses.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Reloads the whole collection.
    Refresh,

    /// Creates an item. Documents must carry a file.
    CreateItem(ItemDraft),

    /// Replaces an item's fields.
    UpdateItem { id: ItemId, draft: ItemDraft },

    /// Deletes an item.
    DeleteItem(ItemId),

    /// Selects a type filter; selecting the active one clears it.
    SetPrimaryFilter(Option<ItemType>),

    /// Selects or clears a domain or extension filter.
    SetSecondaryFilter { kind: ItemType, key: Option<String> },

    /// Starts a relevance search. A blank query clears the session.
    SubmitSearch(String),

    /// Clears the search session.
    ClearSearch,

    /// Jumps to a 1-based page, clamped to the valid range.
    SetPage(usize),

    NextPage,

    PrevPage,

    /// Changes the page size (one of 8, 12, 16, 24) and returns to page 1.
    SetPageSize(usize),

    /// Wraps a response from the remote worker.
    RemoteResponse(RemoteResponse),
}

/// Processes an event, mutates application state, and returns actions to execute.
///
/// Returns whether the state visibly changed and the actions to run in order.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidFilter`](crate::domain::CatalogError::InvalidFilter)
/// for a secondary filter that does not fit the primary filter and
/// [`CatalogError::Validation`](crate::domain::CatalogError::Validation) for an
/// unsupported page size. State is unchanged in both cases. Remote failures
/// are never returned here; they are recorded in the store or search state.
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = event_name(event)).entered();

    let (changed, mut actions) = match event {
        Event::Refresh => {
            let action = dispatch_store(state, StoreOperation::List, RemoteRequest::ListItems);
            (true, vec![action])
        }

        Event::CreateItem(draft) => {
            if let Err(error) = draft.validate_for_create() {
                tracing::debug!(error = %error, "draft rejected before dispatch");
                state.store.reject(StoreOperation::Create, &error);
                (true, vec![])
            } else {
                let request = RemoteRequest::CreateItem { draft: draft.clone() };
                (true, vec![dispatch_store(state, StoreOperation::Create, request)])
            }
        }

        Event::UpdateItem { id, draft } => {
            let request = RemoteRequest::UpdateItem {
                id: id.clone(),
                draft: draft.clone(),
            };
            (true, vec![dispatch_store(state, StoreOperation::Update, request)])
        }

        Event::DeleteItem(id) => {
            let request = RemoteRequest::DeleteItem { id: id.clone() };
            (true, vec![dispatch_store(state, StoreOperation::Delete, request)])
        }

        Event::SetPrimaryFilter(kind) => {
            let changed = state.filter.set_primary(*kind);
            tracing::debug!(
                primary = ?state.filter.primary(),
                changed = changed,
                "primary filter set"
            );
            (changed, vec![])
        }

        Event::SetSecondaryFilter { kind, key } => {
            state.filter.set_secondary(*kind, key.as_deref())?;
            tracing::debug!(
                kind = %kind,
                secondary = ?state.filter.secondary(),
                "secondary filter set"
            );
            (true, vec![])
        }

        Event::SubmitSearch(query) => match state.search.submit(query) {
            Some(seq) => {
                let request = RemoteRequest::Search {
                    seq,
                    query: state.search.query().to_string(),
                    section: state.section_hint(),
                };
                (true, vec![Action::Dispatch(request)])
            }
            None => (true, vec![]),
        },

        Event::ClearSearch => {
            state.search.clear();
            (true, vec![])
        }

        Event::SetPage(page) => {
            let total = state.display_total();
            state.pagination.set_page(*page, total);
            (true, vec![])
        }

        Event::NextPage => {
            let total = state.display_total();
            state.pagination.next(total);
            (true, vec![])
        }

        Event::PrevPage => {
            let total = state.display_total();
            state.pagination.prev(total);
            (true, vec![])
        }

        Event::SetPageSize(size) => {
            state.pagination.set_page_size(*size)?;
            (true, vec![])
        }

        Event::RemoteResponse(response) => handle_remote_response(state, response),
    };

    if let Some(active) = state.reconcile() {
        tracing::debug!(active = active, "search activity changed");
        actions.push(Action::SearchActivity(active));
    }

    Ok((changed, actions))
}

fn dispatch_store(state: &mut AppState, op: StoreOperation, request: RemoteRequest) -> Action {
    state.store.begin(op);
    Action::Dispatch(request)
}

fn handle_remote_response(state: &mut AppState, response: &RemoteResponse) -> (bool, Vec<Action>) {
    match response {
        RemoteResponse::ItemsListed { items } => {
            state.store.apply_list(items.clone());
            (true, vec![])
        }

        RemoteResponse::ItemCreated { item } => {
            state.store.apply_created(item.clone());
            (true, vec![])
        }

        RemoteResponse::ItemUpdated { id, item, refresh } => {
            state.store.apply_updated(id, item.clone());
            if *refresh {
                tracing::debug!(item_id = %id, "degraded update, reloading collection");
                (true, vec![dispatch_store(state, StoreOperation::List, RemoteRequest::ListItems)])
            } else {
                (true, vec![])
            }
        }

        RemoteResponse::ItemDeleted { id } => {
            state.store.apply_deleted(id);
            (true, vec![])
        }

        RemoteResponse::StoreFailed { op, error } => {
            state.store.fail(*op, error);
            (true, vec![])
        }

        RemoteResponse::SearchCompleted { seq, response } => {
            let applied = state.search.apply_response(*seq, response, state.store.items());
            (applied, vec![])
        }

        RemoteResponse::SearchFailed { seq, error } => {
            let applied = state.search.apply_failure(*seq, error);
            (applied, vec![])
        }
    }
}

const fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Refresh => "refresh",
        Event::CreateItem(_) => "create_item",
        Event::UpdateItem { .. } => "update_item",
        Event::DeleteItem(_) => "delete_item",
        Event::SetPrimaryFilter(_) => "set_primary_filter",
        Event::SetSecondaryFilter { .. } => "set_secondary_filter",
        Event::SubmitSearch(_) => "submit_search",
        Event::ClearSearch => "clear_search",
        Event::SetPage(_) => "set_page",
        Event::NextPage => "next_page",
        Event::PrevPage => "prev_page",
        Event::SetPageSize(_) => "set_page_size",
        Event::RemoteResponse(_) => "remote_response",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::display::Pagination;
    use crate::app::modes::RankingMode;
    use crate::app::search::SearchSession;
    use crate::domain::{CatalogError, FileAttachment, Item};
    use crate::remote::{SearchHit, SearchResponse};

    fn state() -> AppState {
        AppState::new(Pagination::default(), SearchSession::new(RankingMode::Boosted), "")
    }

    fn respond(state: &mut AppState, response: RemoteResponse) -> Vec<Action> {
        handle_event(state, &Event::RemoteResponse(response)).unwrap().1
    }

    fn with_items(items: Vec<Item>) -> AppState {
        let mut state = state();
        handle_event(&mut state, &Event::Refresh).unwrap();
        respond(&mut state, RemoteResponse::ItemsListed { items });
        state
    }

    fn notes(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(i.to_string(), format!("note {i}"), ItemType::Note))
            .collect()
    }

    #[test]
    fn document_without_file_is_never_sent() {
        let mut state = state();
        let draft = ItemDraft::new("Paper", ItemType::Document);
        let (_, actions) = handle_event(&mut state, &Event::CreateItem(draft)).unwrap();
        assert!(actions.is_empty());
        assert_eq!(state.store.error(), Some("no file uploaded"));
        assert!(!state.store.is_loading());
        assert!(state.store.is_empty());
    }

    #[test]
    fn document_with_file_is_dispatched() {
        let mut state = state();
        let draft = ItemDraft::new("Paper", ItemType::Document)
            .with_file(FileAttachment::new("p.pdf", vec![1]));
        let (_, actions) = handle_event(&mut state, &Event::CreateItem(draft)).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [Action::Dispatch(RemoteRequest::CreateItem { .. })]
        ));
        assert!(state.store.is_loading());
    }

    #[test]
    fn toggling_primary_twice_returns_to_first_page() {
        let mut state = with_items(notes(30));
        handle_event(&mut state, &Event::SetPage(3)).unwrap();
        assert_eq!(state.pagination.page(), 3);

        handle_event(&mut state, &Event::SetPrimaryFilter(Some(ItemType::Note))).unwrap();
        handle_event(&mut state, &Event::SetPage(2)).unwrap();
        handle_event(&mut state, &Event::SetPrimaryFilter(Some(ItemType::Note))).unwrap();

        assert_eq!(state.filter.primary(), None);
        assert_eq!(state.pagination.page(), 1);
    }

    #[test]
    fn clearing_an_inactive_primary_filter_is_not_a_change() {
        let mut state = with_items(notes(2));
        let (changed, _) = handle_event(&mut state, &Event::SetPrimaryFilter(None)).unwrap();
        assert!(!changed);

        let event = Event::SetPrimaryFilter(Some(ItemType::Note));
        let (changed, _) = handle_event(&mut state, &event).unwrap();
        assert!(changed);
    }

    #[test]
    fn invalid_secondary_filter_is_an_error() {
        let mut state = with_items(notes(1));
        let result = handle_event(
            &mut state,
            &Event::SetSecondaryFilter {
                kind: ItemType::Link,
                key: Some("a.com".into()),
            },
        );
        assert!(matches!(result, Err(CatalogError::InvalidFilter(_))));
    }

    #[test]
    fn degraded_update_triggers_reload() {
        let doc = Item::new("d", "Doc", ItemType::Document).with_file_path("a.pdf");
        let mut state = with_items(vec![doc]);
        handle_event(
            &mut state,
            &Event::UpdateItem {
                id: ItemId::from("d"),
                draft: ItemDraft::new("Doc v2", ItemType::Document),
            },
        )
        .unwrap();

        let actions = respond(
            &mut state,
            RemoteResponse::ItemUpdated {
                id: ItemId::from("d"),
                item: Item::new("d", "Doc v2", ItemType::Document).with_file_path("a.pdf"),
                refresh: true,
            },
        );
        assert_eq!(actions, vec![Action::Dispatch(RemoteRequest::ListItems)]);
        assert!(state.store.is_loading());
        assert_eq!(state.store.items()[0].title, "Doc v2");
    }

    #[test]
    fn search_carries_section_hint_and_reports_activity() {
        let mut state = with_items(notes(3));
        handle_event(&mut state, &Event::SetPrimaryFilter(Some(ItemType::Note))).unwrap();

        let event = Event::SubmitSearch("  note 1 ".into());
        let (_, actions) = handle_event(&mut state, &event).unwrap();
        let [Action::Dispatch(RemoteRequest::Search { seq, query, section })] = actions.as_slice()
        else {
            panic!("expected a search dispatch, got {actions:?}");
        };
        assert_eq!(query, "note 1");
        assert_eq!(section.as_deref(), Some("note"));

        let actions = respond(
            &mut state,
            RemoteResponse::SearchCompleted {
                seq: *seq,
                response: SearchResponse::new(vec![SearchHit::new("1", Some(0.6))], None),
            },
        );
        assert_eq!(actions, vec![Action::SearchActivity(true)]);

        let (_, actions) = handle_event(&mut state, &Event::ClearSearch).unwrap();
        assert_eq!(actions, vec![Action::SearchActivity(false)]);
    }

    #[test]
    fn out_of_order_search_responses() {
        let mut state = with_items(notes(3));
        handle_event(&mut state, &Event::SubmitSearch("note 1".into())).unwrap();
        let first = state.search.seq();
        handle_event(&mut state, &Event::SubmitSearch("note 2".into())).unwrap();
        let second = state.search.seq();

        respond(
            &mut state,
            RemoteResponse::SearchCompleted {
                seq: second,
                response: SearchResponse::new(vec![SearchHit::new("2", Some(0.9))], None),
            },
        );
        respond(
            &mut state,
            RemoteResponse::SearchFailed {
                seq: first,
                error: CatalogError::Transport("late".into()),
            },
        );

        assert_eq!(state.search.error(), None);
        let shown: Vec<_> = state.display_set().items.iter().map(|i| i.id.to_string()).collect();
        assert_eq!(shown, vec!["2"]);
    }

    #[test]
    fn weak_remote_ranking_displays_keyword_matches() {
        let mut state = with_items(vec![
            Item::new("a", "Gardening", ItemType::Note).with_content("tomatoes"),
            Item::new("b", "Tomato soup", ItemType::Note),
            Item::new("c", "Taxes", ItemType::Note),
        ]);
        handle_event(&mut state, &Event::SubmitSearch("tomato".into())).unwrap();
        let seq = state.search.seq();
        respond(
            &mut state,
            RemoteResponse::SearchCompleted {
                seq,
                response: SearchResponse::new(vec![SearchHit::new("c", Some(0.1))], None),
            },
        );

        let shown: Vec<_> = state.display_set().items.iter().map(|i| i.id.to_string()).collect();
        assert_eq!(shown, vec!["a", "b"]);
    }

    #[test]
    fn failed_delete_keeps_item_and_records_message() {
        let mut state = with_items(notes(2));
        handle_event(&mut state, &Event::DeleteItem(ItemId::from("0"))).unwrap();
        respond(
            &mut state,
            RemoteResponse::StoreFailed {
                op: StoreOperation::Delete,
                error: CatalogError::Remote {
                    status: Some(404),
                    message: "Item not found".into(),
                },
            },
        );
        assert_eq!(state.store.len(), 2);
        assert_eq!(state.store.error(), Some("Item not found"));
    }
}
