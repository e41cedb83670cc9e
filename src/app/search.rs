//! Search ranking session.
//!
//! The session turns a query into an ordered list of item identifiers. The
//! ranking endpoint decides relevance; locally the session either trusts that
//! order or re-scores it with substring bonuses. When the remote result is
//! empty, or the re-scored list is uniformly weak, the session throws the
//! remote ranking away and substitutes a plain keyword match over the local
//! collection. The two are never merged.
//!
//! Every submit and clear bumps a sequence number. Requests are stamped with
//! the number current at dispatch and a response carrying any other number is
//! discarded, so a slow response can never overwrite a newer query or a clear.

use crate::app::modes::{RankingMode, SearchPhase};
use crate::domain::{CatalogError, Item, ItemId};
use crate::remote::{SearchHit, SearchResponse};
use std::collections::{HashMap, HashSet};

/// Boosted score below which a ranked hit counts as weak.
///
/// When every hit is weak the remote ranking is replaced by keyword matches.
/// Overridable through [`SearchSession::with_threshold`].
pub const WEAK_SCORE_THRESHOLD: f64 = 0.2;

/// Bonus for a query found in the title.
pub const TITLE_BONUS: f64 = 0.5;
/// Bonus for a query found in the URL.
pub const URL_BONUS: f64 = 0.2;
/// Bonus for a query found in any tag.
pub const TAG_BONUS: f64 = 0.3;

/// Notice shown when a query completes with no matches.
pub const NO_MATCHES_NOTICE: &str = "No matches found";

/// Coarse relevance label derived from a boosted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLabel {
    Strong,
    Related,
    Weak,
    Low,
}

impl MatchLabel {
    /// ```
    /// use brainbox::app::search::MatchLabel;
    ///
    /// assert_eq!(MatchLabel::from_score(0.7), MatchLabel::Strong);
    /// assert_eq!(MatchLabel::from_score(0.39), MatchLabel::Weak);
    /// assert_eq!(MatchLabel::from_score(f64::NAN), MatchLabel::Low);
    /// ```
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        let score = if score.is_finite() { score } else { 0.0 };
        if score >= 0.7 {
            Self::Strong
        } else if score >= 0.4 {
            Self::Related
        } else if score >= 0.2 {
            Self::Weak
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "Strong match",
            Self::Related => "Related",
            Self::Weak => "Weakly related",
            Self::Low => "Low match",
        }
    }
}

/// Similarity plus substring bonuses, clamped to `[0, 1]`.
///
/// `query` must already be lower-cased; an empty query earns no bonus.
#[must_use]
pub fn boosted_score(similarity: f64, title: &str, url: &str, tags: &[String], query: &str) -> f64 {
    let base = if similarity.is_finite() { similarity } else { 0.0 };
    if query.is_empty() {
        return base.clamp(0.0, 1.0);
    }
    let mut bonus = 0.0;
    if title.to_lowercase().contains(query) {
        bonus += TITLE_BONUS;
    }
    if url.to_lowercase().contains(query) {
        bonus += URL_BONUS;
    }
    if tags.iter().any(|t| t.to_lowercase().contains(query)) {
        bonus += TAG_BONUS;
    }
    (base + bonus).clamp(0.0, 1.0)
}

/// Re-scores remote hits and sorts them by boosted score, highest first.
///
/// Hit fields missing from the response are taken from the matching local
/// item. Ties keep the remote order. Duplicate identifiers keep their first
/// occurrence.
#[must_use]
pub fn rank_boosted(hits: &[SearchHit], items: &[Item], query: &str) -> Vec<(ItemId, f64)> {
    let query = query.trim().to_lowercase();
    let mut seen = HashSet::new();
    let mut ranked: Vec<(ItemId, f64)> = hits
        .iter()
        .filter(|hit| seen.insert(hit.id.clone()))
        .map(|hit| {
            let local = items.iter().find(|item| item.id == hit.id);
            let title = hit
                .title
                .as_deref()
                .or_else(|| local.map(|i| i.title.as_str()))
                .unwrap_or_default();
            let url = hit
                .url
                .as_deref()
                .or_else(|| local.and_then(|i| i.url.as_deref()))
                .unwrap_or_default();
            let tags = if hit.tags.is_empty() {
                local.map_or(&[][..], |i| i.tags.as_slice())
            } else {
                hit.tags.as_slice()
            };
            let score = boosted_score(hit.similarity.unwrap_or(0.0), title, url, tags, &query);
            (hit.id.clone(), score)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Items whose title, content or any tag contains the query, case-insensitively,
/// in collection order.
#[must_use]
pub fn keyword_matches(items: &[Item], query: &str) -> Vec<ItemId> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter(|item| {
            item.title.to_lowercase().contains(&query)
                || item
                    .content
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&query))
                || item.tags.iter().any(|t| t.to_lowercase().contains(&query))
        })
        .map(|item| item.id.clone())
        .collect()
}

/// State of the current relevance search.
#[derive(Debug, Clone)]
pub struct SearchSession {
    seq: u64,
    query: String,
    order: Vec<ItemId>,
    scores: HashMap<ItemId, f64>,
    phase: SearchPhase,
    error: Option<String>,
    notice: Option<String>,
    threshold: f64,
    mode: RankingMode,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(RankingMode::default())
    }
}

impl SearchSession {
    #[must_use]
    pub fn new(mode: RankingMode) -> Self {
        Self {
            seq: 0,
            query: String::new(),
            order: Vec::new(),
            scores: HashMap::new(),
            phase: SearchPhase::Idle,
            error: None,
            notice: None,
            threshold: WEAK_SCORE_THRESHOLD,
            mode,
        }
    }

    /// Replaces the weak-score threshold. Non-finite values are ignored.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        if threshold.is_finite() {
            self.threshold = threshold;
        }
        self
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Matched identifiers in display order.
    #[must_use]
    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    #[must_use]
    pub const fn phase(&self) -> SearchPhase {
        self.phase
    }

    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub const fn mode(&self) -> RankingMode {
        self.mode
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Informational message such as [`NO_MATCHES_NOTICE`]. Not an error.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Searching
    }

    /// Whether the session's order should replace the filter engine's output.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.phase, SearchPhase::Ranked | SearchPhase::Fallback) && !self.order.is_empty()
    }

    /// Boosted score of a ranked item, if the current order came from ranking.
    #[must_use]
    pub fn score(&self, id: &ItemId) -> Option<f64> {
        self.scores.get(id).copied()
    }

    fn reset(&mut self) {
        self.query.clear();
        self.order.clear();
        self.scores.clear();
        self.error = None;
        self.notice = None;
        self.phase = SearchPhase::Idle;
    }

    /// Starts a new search and returns the sequence number to stamp the
    /// request with.
    ///
    /// A blank query behaves like [`clear`](Self::clear) and returns `None`.
    pub fn submit(&mut self, query: &str) -> Option<u64> {
        let trimmed = query.trim();
        self.seq += 1;
        self.reset();
        if trimmed.is_empty() {
            tracing::debug!(seq = self.seq, "blank query, search cleared");
            return None;
        }
        self.query = trimmed.to_string();
        self.phase = SearchPhase::Searching;
        tracing::debug!(seq = self.seq, query_len = self.query.len(), "search submitted");
        Some(self.seq)
    }

    /// Returns the session to idle. Any response still in flight becomes stale.
    pub fn clear(&mut self) {
        self.seq += 1;
        self.reset();
        tracing::debug!(seq = self.seq, "search cleared");
    }

    fn is_current(&self, seq: u64) -> bool {
        if seq == self.seq && self.phase == SearchPhase::Searching {
            return true;
        }
        tracing::debug!(
            response_seq = seq,
            current_seq = self.seq,
            "discarding stale search response"
        );
        false
    }

    /// Applies a ranking response. Returns `false` if it was stale.
    ///
    /// `items` is the local collection used for missing hit fields and for the
    /// keyword fallback.
    pub fn apply_response(&mut self, seq: u64, response: &SearchResponse, items: &[Item]) -> bool {
        if !self.is_current(seq) {
            return false;
        }

        let trust_remote = match self.mode {
            RankingMode::Remote => true,
            RankingMode::Boosted => false,
            RankingMode::Auto => response.search_type.is_some(),
        };

        if trust_remote {
            let mut seen = HashSet::new();
            for hit in &response.results {
                if seen.insert(hit.id.clone()) {
                    self.order.push(hit.id.clone());
                    if let Some(similarity) = hit.similarity.filter(|s| s.is_finite()) {
                        self.scores.insert(hit.id.clone(), similarity.clamp(0.0, 1.0));
                    }
                }
            }
            if self.order.is_empty() {
                tracing::debug!("remote ranking empty, falling back to keyword match");
                self.order = keyword_matches(items, &self.query);
                self.finish_with(SearchPhase::Fallback);
            } else {
                self.finish_with(SearchPhase::Ranked);
            }
            return true;
        }

        let ranked = rank_boosted(&response.results, items, &self.query);
        let all_weak = ranked.iter().all(|(_, score)| *score < self.threshold);
        if ranked.is_empty() || all_weak {
            tracing::debug!(
                hits = ranked.len(),
                threshold = self.threshold,
                "remote ranking weak, falling back to keyword match"
            );
            self.order = keyword_matches(items, &self.query);
            self.finish_with(SearchPhase::Fallback);
        } else {
            self.order = ranked.iter().map(|(id, _)| id.clone()).collect();
            self.scores = ranked.into_iter().collect();
            self.finish_with(SearchPhase::Ranked);
        }
        true
    }

    fn finish_with(&mut self, phase: SearchPhase) {
        if self.order.is_empty() {
            self.phase = SearchPhase::Empty;
            self.notice = Some(NO_MATCHES_NOTICE.to_string());
        } else {
            self.phase = phase;
        }
        tracing::debug!(phase = ?self.phase, matches = self.order.len(), "search completed");
    }

    /// Applies a failed ranking request. Returns `false` if it was stale.
    pub fn apply_failure(&mut self, seq: u64, error: &CatalogError) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        self.order.clear();
        self.scores.clear();
        self.error = Some(error.search_message());
        self.phase = SearchPhase::Errored;
        tracing::debug!(error = %error, "search errored");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemType;

    fn collection() -> Vec<Item> {
        vec![
            Item::new("1", "Rust ownership", ItemType::Note).with_content("borrowing rules"),
            Item::new("2", "Cooking", ItemType::Link)
                .with_url("https://food.example/pasta")
                .with_tags(["dinner"]),
            Item::new("3", "Travel", ItemType::Note).with_tags(["rust belt"]),
        ]
    }

    fn ids(order: &[ItemId]) -> Vec<&str> {
        order.iter().map(ItemId::as_str).collect()
    }

    #[test]
    fn blank_submit_is_idle() {
        let mut session = SearchSession::default();
        assert_eq!(session.submit("   "), None);
        assert_eq!(session.phase(), SearchPhase::Idle);
        assert!(!session.is_active());
    }

    #[test]
    fn weak_remote_scores_fall_back_to_keywords() {
        let items = collection();
        let mut session = SearchSession::new(RankingMode::Boosted);
        let seq = session.submit("rust").unwrap();

        let response = SearchResponse::new(
            vec![
                SearchHit::new("2", Some(0.05)).with_title("Cooking"),
                SearchHit::new("9", Some(0.1)).with_title("Unrelated"),
            ],
            None,
        );
        assert!(session.apply_response(seq, &response, &items));
        assert_eq!(session.phase(), SearchPhase::Fallback);
        assert_eq!(ids(session.order()), vec!["1", "3"]);
        assert!(session.score(&ItemId::from("2")).is_none());
    }

    #[test]
    fn boosting_reorders_remote_hits() {
        let items = collection();
        let mut session = SearchSession::new(RankingMode::Boosted);
        let seq = session.submit("pasta").unwrap();
        let response = SearchResponse::new(
            vec![SearchHit::new("1", Some(0.3)), SearchHit::new("2", Some(0.25))],
            None,
        );
        session.apply_response(seq, &response, &items);
        assert_eq!(session.phase(), SearchPhase::Ranked);
        assert_eq!(ids(session.order()), vec!["2", "1"]);
        let score = session.score(&ItemId::from("2")).unwrap();
        assert!((score - 0.45).abs() < 1e-9);
        assert_eq!(MatchLabel::from_score(score), MatchLabel::Related);
    }

    #[test]
    fn trusted_remote_order_is_kept() {
        let mut session = SearchSession::new(RankingMode::Auto);
        let seq = session.submit("anything").unwrap();
        let response = SearchResponse::new(
            vec![SearchHit::new("3", Some(0.01)), SearchHit::new("1", Some(0.9))],
            Some("semantic".into()),
        );
        session.apply_response(seq, &response, &collection());
        assert_eq!(ids(session.order()), vec!["3", "1"]);
        assert!(session.is_active());
    }

    #[test]
    fn empty_result_is_a_notice_not_an_error() {
        let mut session = SearchSession::new(RankingMode::Remote);
        let seq = session.submit("nothing").unwrap();
        session.apply_response(seq, &SearchResponse::default(), &collection());
        assert_eq!(session.phase(), SearchPhase::Empty);
        assert!(!session.is_active());
        assert_eq!(session.error(), None);
        assert_eq!(session.notice(), Some(NO_MATCHES_NOTICE));
    }

    #[test]
    fn empty_trusted_ranking_falls_back_to_keywords() {
        let items = collection();
        let mut session = SearchSession::new(RankingMode::Auto);
        let seq = session.submit("rust").unwrap();
        let response = SearchResponse::new(vec![], Some("semantic".into()));
        assert!(session.apply_response(seq, &response, &items));
        assert_eq!(session.phase(), SearchPhase::Fallback);
        assert_eq!(ids(session.order()), vec!["1", "3"]);
        assert!(session.is_active());
        assert_eq!(session.notice(), None);
    }

    #[test]
    fn empty_boosted_ranking_falls_back_to_keywords() {
        let items = collection();
        let mut session = SearchSession::new(RankingMode::Boosted);
        let seq = session.submit("dinner").unwrap();
        assert!(session.apply_response(seq, &SearchResponse::default(), &items));
        assert_eq!(session.phase(), SearchPhase::Fallback);
        assert_eq!(ids(session.order()), vec!["2"]);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let items = collection();
        let mut session = SearchSession::new(RankingMode::Remote);
        let first = session.submit("rust").unwrap();
        let second = session.submit("travel").unwrap();

        let semantic = Some("semantic".to_string());
        let late = SearchResponse::new(vec![SearchHit::new("1", Some(0.9))], semantic.clone());
        assert!(!session.apply_response(first, &late, &items));
        assert_eq!(session.phase(), SearchPhase::Searching);

        let current = SearchResponse::new(vec![SearchHit::new("3", Some(0.8))], semantic);
        assert!(session.apply_response(second, &current, &items));

        session.clear();
        assert!(!session.apply_failure(second, &CatalogError::Transport("late".into())));
        assert_eq!(session.phase(), SearchPhase::Idle);
    }

    #[test]
    fn failure_records_search_message() {
        let mut session = SearchSession::default();
        let seq = session.submit("rust").unwrap();
        session.apply_failure(seq, &CatalogError::AuthorizationMissing);
        assert_eq!(session.phase(), SearchPhase::Errored);
        assert_eq!(session.error(), Some("Please login to use semantic search."));
        assert!(session.order().is_empty());
    }

    #[test]
    fn threshold_is_overridable() {
        let items = collection();
        let mut session = SearchSession::new(RankingMode::Boosted).with_threshold(0.05);
        let seq = session.submit("zzz").unwrap();
        let response = SearchResponse::new(vec![SearchHit::new("2", Some(0.1))], None);
        session.apply_response(seq, &response, &items);
        assert_eq!(session.phase(), SearchPhase::Ranked);
        assert_eq!(ids(session.order()), vec!["2"]);
    }
}
