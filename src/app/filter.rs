//! Filter engine deriving the visible subset of the collection.
//!
//! Everything here except [`FilterState`]'s setters is a pure function of the
//! collection and the filter state, recomputed on every change rather than
//! maintained incrementally.
//!
//! # Sub-categories
//!
//! Links and documents can be narrowed further by a secondary key:
//!
//! - **link**: the stored `categorySub`, else the URL hostname lower-cased with a
//!   leading `www.` removed
//! - **document**: the stored `categorySub`, else the lower-cased extension of the
//!   file reference, else of the title
//!
//! A value that cannot be parsed yields an empty sub-category.

use crate::domain::{CatalogError, Item, ItemType, Result};
use reqwest::Url;
use std::collections::{BTreeMap, BTreeSet};

/// Primary type filter plus optional sub-category key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    primary: Option<ItemType>,
    secondary: Option<String>,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn primary(&self) -> Option<ItemType> {
        self.primary
    }

    #[must_use]
    pub fn secondary(&self) -> Option<&str> {
        self.secondary.as_deref()
    }

    /// Selects a primary type filter, toggling it off when it is already active.
    ///
    /// Always clears the secondary filter. Returns whether the primary filter
    /// changed.
    ///
    /// ```
    /// use brainbox::app::filter::FilterState;
    /// use brainbox::domain::ItemType;
    ///
    /// let mut filter = FilterState::new();
    /// filter.set_primary(Some(ItemType::Link));
    /// filter.set_primary(Some(ItemType::Link));
    /// assert_eq!(filter.primary(), None);
    /// ```
    pub fn set_primary(&mut self, kind: Option<ItemType>) -> bool {
        let next = match kind {
            Some(kind) if self.primary == Some(kind) => None,
            other => other,
        };
        let changed = next != self.primary;
        self.primary = next;
        self.secondary = None;
        changed
    }

    /// Sets or clears the secondary filter for `kind`.
    ///
    /// Keys are trimmed and lower-cased; an empty key clears the filter.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidFilter`] if `kind` is not the active
    /// primary filter or has no sub-categories.
    pub fn set_secondary(&mut self, kind: ItemType, key: Option<&str>) -> Result<()> {
        if !kind.has_sub_categories() {
            return Err(CatalogError::InvalidFilter(format!("{kind} items have no sub-categories")));
        }
        if self.primary != Some(kind) {
            return Err(CatalogError::InvalidFilter(format!(
                "secondary filter for {kind} requires {kind} as the primary filter"
            )));
        }
        self.secondary = key
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());
        Ok(())
    }
}

/// Lower-cased hostname of a URL with a leading `www.` removed.
///
/// Returns an empty string when the URL cannot be parsed.
///
/// ```
/// use brainbox::app::filter::normalized_host;
///
/// assert_eq!(normalized_host("https://WWW.Example.com/a?b"), "example.com");
/// assert_eq!(normalized_host("not a url"), "");
/// ```
#[must_use]
pub fn normalized_host(url: &str) -> String {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .map(|host| host.strip_prefix("www.").map_or_else(|| host.clone(), String::from))
        .unwrap_or_default()
}

/// Lower-cased extension of the last path segment, ignoring any query string.
#[must_use]
pub fn file_extension(reference: &str) -> String {
    let without_query = reference.split(['?', '#']).next().unwrap_or_default();
    let segment = without_query.rsplit(['/', '\\']).next().unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Sub-category of an item, or an empty string when it has none.
#[must_use]
pub fn sub_category(item: &Item) -> String {
    if let Some(stored) = item.category_sub.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return stored.to_lowercase();
    }
    match item.kind {
        ItemType::Link => item.url.as_deref().map(normalized_host).unwrap_or_default(),
        ItemType::Document => {
            let from_file = item.file_path.as_deref().map(file_extension).unwrap_or_default();
            if from_file.is_empty() {
                file_extension(&item.title)
            } else {
                from_file
            }
        }
        ItemType::Note | ItemType::Video => String::new(),
    }
}

/// Items passing the filter, in collection order.
#[must_use]
pub fn derive_visible<'a>(items: &'a [Item], filter: &FilterState) -> Vec<&'a Item> {
    let Some(primary) = filter.primary else {
        return items.iter().collect();
    };
    let secondary = filter
        .secondary
        .as_deref()
        .filter(|_| primary.has_sub_categories());

    items
        .iter()
        .filter(|item| item.kind == primary)
        .filter(|item| secondary.map_or(true, |key| sub_category(item) == key))
        .collect()
}

/// Number of items per type present in the collection, alphabetically by type.
#[must_use]
pub fn compute_available_types(items: &[Item]) -> Vec<(ItemType, usize)> {
    let mut counts: BTreeMap<&str, (ItemType, usize)> = BTreeMap::new();
    for item in items {
        counts.entry(item.kind.as_str()).or_insert((item.kind, 0)).1 += 1;
    }
    counts.into_values().collect()
}

/// Distinct sub-categories across the whole collection, for secondary navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubGroups {
    /// Sorted link domains.
    pub domains: Vec<String>,
    /// Sorted document extensions.
    pub extensions: Vec<String>,
}

impl SubGroups {
    #[must_use]
    pub fn for_type(&self, kind: ItemType) -> &[String] {
        match kind {
            ItemType::Link => &self.domains,
            ItemType::Document => &self.extensions,
            ItemType::Note | ItemType::Video => &[],
        }
    }
}

/// Collects sub-categories from all items, regardless of the active filter.
#[must_use]
pub fn compute_sub_groups(items: &[Item]) -> SubGroups {
    let mut domains = BTreeSet::new();
    let mut extensions = BTreeSet::new();
    for item in items {
        let target = match item.kind {
            ItemType::Link => &mut domains,
            ItemType::Document => &mut extensions,
            ItemType::Note | ItemType::Video => continue,
        };
        let key = sub_category(item);
        if !key.is_empty() {
            target.insert(key);
        }
    }
    SubGroups {
        domains: domains.into_iter().collect(),
        extensions: extensions.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Vec<Item> {
        vec![
            Item::new("1", "n", ItemType::Note),
            Item::new("2", "a", ItemType::Link).with_url("https://a.com/x"),
            Item::new("3", "b", ItemType::Link).with_url("https://b.com/y"),
        ]
    }

    fn ids(items: &[&Item]) -> Vec<String> {
        items.iter().map(|i| i.id.to_string()).collect()
    }

    #[test]
    fn link_domain_filter_scenario() {
        let items = scenario();
        let mut filter = FilterState::new();
        filter.set_primary(Some(ItemType::Link));
        filter.set_secondary(ItemType::Link, Some("a.com")).unwrap();
        assert_eq!(ids(&derive_visible(&items, &filter)), vec!["2"]);
    }

    #[test]
    fn derive_visible_is_idempotent_and_total() {
        let items = scenario();
        let mut filter = FilterState::new();
        filter.set_primary(Some(ItemType::Video));
        let first = derive_visible(&items, &filter);
        assert!(first.is_empty());
        assert_eq!(first, derive_visible(&items, &filter));
    }

    #[test]
    fn toggling_primary_twice_clears_it() {
        let mut filter = FilterState::new();
        assert!(filter.set_primary(Some(ItemType::Link)));
        filter.set_secondary(ItemType::Link, Some("a.com")).unwrap();
        assert!(filter.set_primary(Some(ItemType::Link)));
        assert_eq!(filter, FilterState::new());
    }

    #[test]
    fn secondary_requires_matching_primary() {
        let mut filter = FilterState::new();
        assert!(matches!(
            filter.set_secondary(ItemType::Link, Some("a.com")),
            Err(CatalogError::InvalidFilter(_))
        ));
        filter.set_primary(Some(ItemType::Note));
        assert!(filter.set_secondary(ItemType::Note, Some("x")).is_err());
    }

    #[test]
    fn sub_category_prefers_stored_label() {
        let item = Item::new("1", "t", ItemType::Link)
            .with_url("https://www.rust-lang.org")
            .with_category_sub("Docs");
        assert_eq!(sub_category(&item), "docs");

        let item = Item::new("2", "t", ItemType::Link).with_url("https://www.rust-lang.org/learn");
        assert_eq!(sub_category(&item), "rust-lang.org");

        let item = Item::new("3", "t", ItemType::Link).with_url("::bad::");
        assert_eq!(sub_category(&item), "");
    }

    #[test]
    fn document_extension_from_file_then_title() {
        let doc =
            Item::new("1", "Report", ItemType::Document).with_file_path("uploads/ab12.PDF?dl=1");
        assert_eq!(sub_category(&doc), "pdf");

        let doc = Item::new("2", "notes.docx", ItemType::Document);
        assert_eq!(sub_category(&doc), "docx");

        assert_eq!(file_extension(".bashrc"), "");
    }

    #[test]
    fn available_types_sorted_alphabetically() {
        let mut items = scenario();
        items.push(Item::new("4", "d", ItemType::Document).with_file_path("x.pdf"));
        assert_eq!(
            compute_available_types(&items),
            vec![(ItemType::Document, 1), (ItemType::Link, 2), (ItemType::Note, 1)]
        );
    }

    #[test]
    fn sub_groups_ignore_active_filter_and_blanks() {
        let mut items = scenario();
        items.push(Item::new("4", "d", ItemType::Document).with_file_path("x.pdf"));
        items.push(Item::new("5", "e", ItemType::Link).with_url("nope"));
        let groups = compute_sub_groups(&items);
        assert_eq!(groups.domains, vec!["a.com", "b.com"]);
        assert_eq!(groups.extensions, vec!["pdf"]);
        assert!(groups.for_type(ItemType::Note).is_empty());
    }
}
