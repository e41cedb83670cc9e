//! Application state container and view model computation.
//!
//! [`AppState`] owns the four catalog components and is passed by reference to
//! whatever drives it; there is no global instance. Everything shown to the
//! user is derived from it on demand.
//!
//! # Reconciliation
//!
//! After every event the handler calls [`AppState::reconcile`]. It fingerprints
//! the inputs that decide the display order (search activity and order, filter
//! state). When the fingerprint changes the page goes back to 1; otherwise the
//! page is only clamped, so a shrinking collection never leaves the user past
//! the last page.

use super::display::{paginate, resolve_display_set, DisplaySet, Page, Pagination};
use super::filter::{compute_available_types, compute_sub_groups, FilterState};
use super::search::{MatchLabel, SearchSession};
use super::store::ItemStore;
use crate::domain::{Item, ItemType};
use crate::ui::viewmodel::{
    is_pdf, link_preview, note_preview, resolve_link, Card, CardBody, DocumentFile, EmptyState,
    FooterInfo, HeaderInfo, NavEntry, SearchBarInfo, StatusInfo, SubNavEntry, UIViewModel,
};
use fuzzy_matcher::skim::SkimMatcherV2;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Central application state container.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Canonical collection mirrored from the remote store.
    pub store: ItemStore,

    /// Primary and secondary filter selection.
    pub filter: FilterState,

    /// Current relevance search.
    pub search: SearchSession,

    /// Page size and current page of the display set.
    pub pagination: Pagination,

    /// Base used to resolve relative item URLs and file references.
    pub server_url: String,

    display_key: u64,
    search_active: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Pagination::default(), SearchSession::default(), String::new())
    }
}

impl AppState {
    #[must_use]
    pub fn new(
        pagination: Pagination,
        search: SearchSession,
        server_url: impl Into<String>,
    ) -> Self {
        let mut state = Self {
            store: ItemStore::new(),
            filter: FilterState::new(),
            search,
            pagination,
            server_url: server_url.into(),
            display_key: 0,
            search_active: false,
        };
        state.display_key = state.display_fingerprint();
        state.search_active = state.search.is_active();
        state
    }

    /// View context sent with search requests: the active primary filter.
    #[must_use]
    pub fn section_hint(&self) -> Option<String> {
        self.filter.primary().map(|kind| kind.as_str().to_string())
    }

    /// Ordered items to show, before pagination.
    #[must_use]
    pub fn display_set(&self) -> DisplaySet<'_> {
        resolve_display_set(self.store.items(), &self.filter, &self.search)
    }

    /// Current page of the display set.
    #[must_use]
    pub fn current_page(&self) -> Page<'_> {
        paginate(&self.display_set().items, &self.pagination)
    }

    /// Number of items in the display set.
    #[must_use]
    pub fn display_total(&self) -> usize {
        self.display_set().items.len()
    }

    fn display_fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        let active = self.search.is_active();
        active.hash(&mut hasher);
        if active {
            self.search.order().hash(&mut hasher);
        }
        self.filter.hash(&mut hasher);
        hasher.finish()
    }

    /// Re-derives pagination after a state change.
    ///
    /// Returns the new search activity when it changed since the last call.
    pub fn reconcile(&mut self) -> Option<bool> {
        let key = self.display_fingerprint();
        if key == self.display_key {
            self.pagination.clamp(self.display_total());
        } else {
            tracing::debug!("display inputs changed, back to first page");
            self.display_key = key;
            self.pagination.reset();
        }

        let active = self.search.is_active();
        if active == self.search_active {
            None
        } else {
            self.search_active = active;
            Some(active)
        }
    }

    /// Computes the view model for the current page.
    #[must_use]
    pub fn compute_viewmodel(&self) -> UIViewModel {
        let _span = tracing::debug_span!(
            "compute_viewmodel",
            items = self.store.len(),
            page = self.pagination.page()
        )
        .entered();

        let set = self.display_set();
        let page = paginate(&set.items, &self.pagination);

        let matcher = (!self.search.query().is_empty()).then(SkimMatcherV2::default);
        let cards: Vec<Card> = page
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.compute_card(item, page.offset + i, set.from_search, matcher.as_ref())
            })
            .collect();

        let empty_state = cards.is_empty().then(|| self.compute_empty_state(set.from_search));

        UIViewModel {
            header: self.compute_header(set.from_search, page.total),
            nav: self.compute_nav(),
            sub_nav: self.compute_sub_nav(),
            search_bar: (!self.search.query().is_empty()).then(|| SearchBarInfo {
                query: self.search.query().to_string(),
                phase: self.search.phase(),
            }),
            cards,
            empty_state,
            status: StatusInfo {
                loading: self.store.is_loading(),
                searching: self.search.is_loading(),
                store_error: self.store.error().map(String::from),
                search_error: self.search.error().map(String::from),
                notice: self.search.notice().map(String::from),
            },
            footer: FooterInfo {
                page: page.page,
                total_pages: page.total_pages,
                page_size: self.pagination.page_size(),
                total: page.total,
            },
        }
    }

    fn compute_header(&self, from_search: bool, total: usize) -> HeaderInfo {
        let title = if from_search {
            format!("Results for \"{}\" ({total})", self.search.query())
        } else {
            match (self.filter.primary(), self.filter.secondary()) {
                (None, _) => format!("All items ({total})"),
                (Some(kind), None) => format!("{kind} items ({total})"),
                (Some(kind), Some(sub)) => format!("{kind} items / {sub} ({total})"),
            }
        };
        HeaderInfo { title }
    }

    fn compute_nav(&self) -> Vec<NavEntry> {
        compute_available_types(self.store.items())
            .into_iter()
            .map(|(kind, count)| NavEntry {
                kind,
                count,
                is_active: self.filter.primary() == Some(kind),
            })
            .collect()
    }

    fn compute_sub_nav(&self) -> Vec<SubNavEntry> {
        let Some(primary) = self.filter.primary().filter(|kind| kind.has_sub_categories()) else {
            return Vec::new();
        };
        compute_sub_groups(self.store.items())
            .for_type(primary)
            .iter()
            .map(|key| SubNavEntry {
                key: key.clone(),
                is_active: self.filter.secondary() == Some(key.as_str()),
            })
            .collect()
    }

    fn compute_card(
        &self,
        item: &Item,
        position: usize,
        from_search: bool,
        matcher: Option<&SkimMatcherV2>,
    ) -> Card {
        let match_label = if from_search {
            self.search.score(&item.id).map(MatchLabel::from_score)
        } else {
            None
        };

        Card {
            id: item.id.to_string(),
            position,
            kind: item.kind,
            title: item.title.clone(),
            title_highlights: matcher
                .map_or_else(Vec::new, |m| self.compute_highlight_ranges(&item.title, m)),
            tags: item.tags.clone(),
            body: self.compute_card_body(item),
            match_label,
        }
    }

    fn compute_card_body(&self, item: &Item) -> CardBody {
        let target = || {
            item.target_url()
                .filter(|u| !u.trim().is_empty())
                .map(|u| resolve_link(&self.server_url, u))
                .unwrap_or_default()
        };
        match item.kind {
            ItemType::Note => CardBody::Note {
                preview: note_preview(item.note_content().unwrap_or_default()),
            },
            ItemType::Link => {
                let url = target();
                CardBody::Link { preview: link_preview(&url), url }
            }
            ItemType::Video => {
                let url = target();
                CardBody::Video { preview: link_preview(&url), url }
            }
            ItemType::Document => CardBody::Document {
                file: item.file_reference().map(|reference| DocumentFile {
                    url: resolve_link(&self.server_url, reference),
                    is_pdf: is_pdf(reference),
                }),
            },
        }
    }

    /// Character ranges of `text` matched by the query, consecutive indices
    /// coalesced.
    fn compute_highlight_ranges(&self, text: &str, matcher: &SkimMatcherV2) -> Vec<(usize, usize)> {
        use fuzzy_matcher::FuzzyMatcher;

        let Some((_score, indices)) = matcher.fuzzy_indices(text, self.search.query()) else {
            return Vec::new();
        };

        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for idx in indices {
            match ranges.last_mut() {
                Some((_, end)) if *end == idx => *end = idx + 1,
                _ => ranges.push((idx, idx + 1)),
            }
        }
        ranges
    }

    fn compute_empty_state(&self, from_search: bool) -> EmptyState {
        let (message, subtitle) = if self.store.is_loading() && self.store.is_empty() {
            ("Loading items…", "")
        } else if from_search {
            ("No matching items", "The matched items are no longer in your collection")
        } else if self.store.is_empty() {
            ("No items yet", "Add a note, link, document or video to get started")
        } else {
            ("Nothing matches this filter", "Clear the filter to see all items")
        };
        EmptyState {
            message: message.to_string(),
            subtitle: subtitle.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::modes::RankingMode;
    use crate::domain::{ItemId, StoreOperation};
    use crate::remote::{SearchHit, SearchResponse};

    fn loaded(items: Vec<Item>) -> AppState {
        let search = SearchSession::new(RankingMode::Remote);
        let mut state = AppState::new(Pagination::default(), search, "http://localhost:5555");
        state.store.begin(StoreOperation::List);
        state.store.apply_list(items);
        state.reconcile();
        state
    }

    fn notes(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(i.to_string(), format!("note {i}"), ItemType::Note))
            .collect()
    }

    #[test]
    fn filter_change_resets_page() {
        let mut state = loaded(notes(30));
        state.pagination.set_page(3, state.display_total());
        assert_eq!(state.reconcile(), None);
        assert_eq!(state.pagination.page(), 3);

        state.filter.set_primary(Some(ItemType::Note));
        state.reconcile();
        assert_eq!(state.pagination.page(), 1);
    }

    #[test]
    fn shrinking_collection_clamps_page() {
        let mut state = loaded(notes(30));
        state.pagination.set_page(3, state.display_total());
        for i in 12..30 {
            state.store.begin(StoreOperation::Delete);
            state.store.apply_deleted(&ItemId::new(i.to_string()));
        }
        state.reconcile();
        assert_eq!(state.pagination.page(), 1);
    }

    #[test]
    fn search_activity_is_reported_once() {
        let mut state = loaded(notes(3));
        let seq = state.search.submit("note").unwrap();
        assert_eq!(state.reconcile(), None);

        let response = SearchResponse::new(vec![SearchHit::new("1", Some(0.8))], None);
        state.search.apply_response(seq, &response, state.store.items());
        assert_eq!(state.reconcile(), Some(true));
        assert_eq!(state.reconcile(), None);

        state.search.clear();
        assert_eq!(state.reconcile(), Some(false));
    }

    #[test]
    fn viewmodel_cards_and_labels() {
        let items = vec![
            Item::new("1", "Rust ownership", ItemType::Note).with_content("x".repeat(200)),
            Item::new("2", "Paper", ItemType::Document).with_file_path("/uploads/p.pdf"),
            Item::new("3", "Empty doc", ItemType::Document),
        ];
        let mut state = loaded(items);
        let seq = state.search.submit("rust").unwrap();
        let response = SearchResponse::new(
            vec![SearchHit::new("1", Some(0.75)), SearchHit::new("2", Some(0.1))],
            None,
        );
        state.search.apply_response(seq, &response, state.store.items());
        state.reconcile();

        let vm = state.compute_viewmodel();
        assert_eq!(vm.cards.len(), 2);
        assert_eq!(vm.header.title, "Results for \"rust\" (2)");
        assert_eq!(vm.cards[0].match_label, Some(MatchLabel::Strong));
        assert_eq!(vm.cards[0].title_highlights, vec![(0, 4)]);
        match &vm.cards[1].body {
            CardBody::Document { file: Some(file) } => {
                assert_eq!(file.url, "http://localhost:5555/uploads/p.pdf");
                assert!(file.is_pdf);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn viewmodel_nav_and_empty_state() {
        let items = vec![
            Item::new("1", "a", ItemType::Link).with_url("https://a.com/x"),
            Item::new("2", "b", ItemType::Link).with_url("https://www.b.com/y"),
            Item::new("3", "c", ItemType::Note),
        ];
        let mut state = loaded(items);
        state.filter.set_primary(Some(ItemType::Link));
        state.filter.set_secondary(ItemType::Link, Some("zzz.com")).unwrap();
        state.reconcile();

        let vm = state.compute_viewmodel();
        assert_eq!(vm.nav.len(), 2);
        assert!(vm.nav[0].is_active);
        let keys: Vec<_> = vm.sub_nav.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a.com", "b.com"]);
        assert_eq!(
            vm.empty_state.map(|e| e.message).as_deref(),
            Some("Nothing matches this filter")
        );
        assert_eq!(state.section_hint().as_deref(), Some("link"));
    }
}
