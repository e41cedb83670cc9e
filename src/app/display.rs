//! Display reconciler and pagination.
//!
//! Decides which items are shown and in what order. An active search owns the
//! order; otherwise the filter engine's output is shown in collection order.
//! The result is then cut into pages.

use crate::app::filter::{derive_visible, FilterState};
use crate::app::search::SearchSession;
use crate::domain::{CatalogError, Item, ItemId, Result};
use std::collections::HashMap;
use std::ops::Range;

/// Page sizes the user can choose from.
pub const PAGE_SIZES: [usize; 4] = [8, 12, 16, 24];

pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Number of pages needed for `total` items, never less than one.
///
/// ```
/// use brainbox::app::display::total_pages;
///
/// assert_eq!(total_pages(25, 12), 3);
/// assert_eq!(total_pages(0, 12), 1);
/// ```
#[must_use]
pub const fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    let pages = total.div_ceil(page_size);
    if pages == 0 {
        1
    } else {
        pages
    }
}

/// Page size and 1-based current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

impl Pagination {
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] if `page_size` is not one of
    /// [`PAGE_SIZES`].
    pub fn new(page_size: usize) -> Result<Self> {
        let mut pagination = Self::default();
        pagination.set_page_size(page_size)?;
        Ok(pagination)
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Changes the page size and returns to the first page.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] if `page_size` is not one of
    /// [`PAGE_SIZES`]; the current pagination is kept.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if !PAGE_SIZES.contains(&page_size) {
            return Err(CatalogError::Validation(format!(
                "page size must be one of {PAGE_SIZES:?}, got {page_size}"
            )));
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(())
    }

    /// Moves to `page`, clamped into the valid range for `total` items.
    pub fn set_page(&mut self, page: usize, total: usize) {
        self.page = page.clamp(1, total_pages(total, self.page_size));
    }

    pub fn next(&mut self, total: usize) {
        self.set_page(self.page.saturating_add(1), total);
    }

    pub fn prev(&mut self, total: usize) {
        self.set_page(self.page.saturating_sub(1), total);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Pulls the current page back into range after the total shrank.
    pub fn clamp(&mut self, total: usize) {
        self.set_page(self.page, total);
    }

    /// Index range of the current page within `total` items.
    #[must_use]
    pub fn bounds(&self, total: usize) -> Range<usize> {
        let page = self.page.clamp(1, total_pages(total, self.page_size));
        let start = (self.page_size * (page - 1)).min(total);
        let end = (self.page_size * page).min(total);
        start..end
    }
}

/// Final ordered sequence shown to the user, before pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySet<'a> {
    pub items: Vec<&'a Item>,
    /// Whether the order came from the search session.
    pub from_search: bool,
}

/// Merges search and filter state into the display set.
///
/// Search identifiers that no longer resolve against the collection are
/// dropped, preserving the order of the rest.
#[must_use]
pub fn resolve_display_set<'a>(
    items: &'a [Item],
    filter: &FilterState,
    search: &SearchSession,
) -> DisplaySet<'a> {
    if search.is_active() {
        let by_id: HashMap<&ItemId, &Item> = items.iter().map(|item| (&item.id, item)).collect();
        let resolved: Vec<&Item> = search
            .order()
            .iter()
            .filter_map(|id| by_id.get(id).copied())
            .collect();
        if resolved.len() < search.order().len() {
            tracing::debug!(
                dropped = search.order().len() - resolved.len(),
                "search results no longer in collection"
            );
        }
        return DisplaySet {
            items: resolved,
            from_search: true,
        };
    }

    DisplaySet {
        items: derive_visible(items, filter),
        from_search: false,
    }
}

/// One page of the display set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a Item>,
    /// Effective 1-based page number after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Size of the whole display set.
    pub total: usize,
    /// Index of the first item on this page within the display set.
    pub offset: usize,
}

#[must_use]
pub fn paginate<'a>(set: &[&'a Item], pagination: &Pagination) -> Page<'a> {
    let total = set.len();
    let total_pages = total_pages(total, pagination.page_size());
    let range = pagination.bounds(total);
    Page {
        page: pagination.page().clamp(1, total_pages),
        offset: range.start,
        items: set[range].to_vec(),
        total_pages,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::modes::RankingMode;
    use crate::domain::ItemType;
    use crate::remote::{SearchHit, SearchResponse};

    fn notes(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(i.to_string(), format!("note {i}"), ItemType::Note))
            .collect()
    }

    #[test]
    fn pagination_of_twenty_five() {
        let items = notes(25);
        let set: Vec<&Item> = items.iter().collect();
        let mut pagination = Pagination::default();

        let page = paginate(&set, &pagination);
        assert_eq!(page.items.len(), 12);
        assert_eq!(page.items[0].id.as_str(), "0");

        pagination.set_page(3, set.len());
        let page = paginate(&set, &pagination);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id.as_str(), "24");

        pagination.set_page(4, set.len());
        assert_eq!(pagination.page(), 3);
    }

    #[test]
    fn page_clamps_when_total_shrinks() {
        let mut pagination = Pagination::default();
        pagination.set_page(3, 30);
        pagination.clamp(5);
        assert_eq!(pagination.page(), 1);
        pagination.prev(5);
        assert_eq!(pagination.page(), 1);
    }

    #[test]
    fn page_size_must_be_offered() {
        let mut pagination = Pagination::new(24).unwrap();
        pagination.set_page(2, 100);
        assert!(pagination.set_page_size(10).is_err());
        assert_eq!(pagination.page_size(), 24);
        pagination.set_page_size(8).unwrap();
        assert_eq!(pagination.page(), 1);
    }

    #[test]
    fn search_order_wins_and_drops_missing() {
        let items = notes(3);
        let mut search = SearchSession::new(RankingMode::Remote);
        let seq = search.submit("note").unwrap();
        let response = SearchResponse::new(
            vec![
                SearchHit::new("2", Some(0.9)),
                SearchHit::new("gone", Some(0.8)),
                SearchHit::new("0", Some(0.7)),
            ],
            None,
        );
        search.apply_response(seq, &response, &items);

        let mut filter = FilterState::new();
        filter.set_primary(Some(ItemType::Link));
        let set = resolve_display_set(&items, &filter, &search);
        assert!(set.from_search);
        let ids: Vec<_> = set.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "0"]);
    }

    #[test]
    fn inactive_search_uses_filter_output() {
        let items = notes(3);
        let set = resolve_display_set(&items, &FilterState::new(), &SearchSession::default());
        assert!(!set.from_search);
        assert_eq!(set.items.len(), 3);
    }
}
