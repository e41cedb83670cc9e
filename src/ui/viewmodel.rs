//! View model types representing renderable catalog state.
//!
//! View models are created via `AppState::compute_viewmodel()` and consumed by
//! the renderer. They contain no business logic, only display-ready data:
//! resolved URLs, truncated previews, match labels and highlight ranges.
//!
//! The free functions at the bottom are the card formatting rules and are
//! usable on their own.

use crate::app::search::MatchLabel;
use crate::app::modes::SearchPhase;
use crate::domain::ItemType;
use reqwest::Url;

/// Maximum number of characters of a note shown on its card.
pub const NOTE_PREVIEW_CHARS: usize = 120;

/// Label shown for a document that has no uploaded file.
pub const NO_FILE_LABEL: &str = "No file";

/// Complete view model for one rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct UIViewModel {
    pub header: HeaderInfo,

    /// Type navigation with per-type counts.
    pub nav: Vec<NavEntry>,

    /// Secondary navigation for the active primary filter, if it has one.
    pub sub_nav: Vec<SubNavEntry>,

    /// Present while a query is entered.
    pub search_bar: Option<SearchBarInfo>,

    /// Cards on the current page.
    pub cards: Vec<Card>,

    /// Shown instead of cards when the page is empty.
    pub empty_state: Option<EmptyState>,

    pub status: StatusInfo,

    pub footer: FooterInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,
}

/// One entry in the type navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub kind: ItemType,
    pub count: usize,
    pub is_active: bool,
}

/// One entry in the secondary (domain or extension) navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubNavEntry {
    pub key: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBarInfo {
    pub query: String,
    pub phase: SearchPhase,
}

/// Loading flags and messages from the item store and the search session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    pub loading: bool,
    pub searching: bool,
    pub store_error: Option<String>,
    pub search_error: Option<String>,
    pub notice: Option<String>,
}

/// Pagination summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterInfo {
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}

/// Display information for a single item.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,

    /// Position within the whole display set, 0-based.
    pub position: usize,

    pub kind: ItemType,

    pub title: String,

    /// Character ranges of `title` matching the active query.
    ///
    /// Each tuple is `(start_index, end_index)` in character indices, end
    /// exclusive.
    pub title_highlights: Vec<(usize, usize)>,

    pub tags: Vec<String>,

    pub body: CardBody,

    /// Relevance label, only for items ordered by a scored search.
    pub match_label: Option<MatchLabel>,
}

/// Type-specific card content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    Note { preview: String },
    Link { url: String, preview: LinkPreview },
    Video { url: String, preview: LinkPreview },
    Document { file: Option<DocumentFile> },
}

/// How a link or video target can be previewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkPreview {
    YouTube { video_id: String, thumbnail: String },
    Generic { host: String },
}

/// Resolved location of an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub url: String,
    pub is_pdf: bool,
}

/// Resolves an item URL or file reference against the server.
///
/// Absolute `http(s)` URLs are returned unchanged; anything else is joined onto
/// `base` with exactly one slash in between.
///
/// ```
/// use brainbox::ui::viewmodel::resolve_link;
///
/// assert_eq!(
///     resolve_link("http://localhost:5555/", "/uploads/a.pdf"),
///     "http://localhost:5555/uploads/a.pdf"
/// );
/// assert_eq!(resolve_link("http://localhost:5555", "HTTPS://x.dev"), "HTTPS://x.dev");
/// ```
#[must_use]
pub fn resolve_link(base: &str, value: &str) -> String {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return value.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = value.trim_start_matches('/');
    if base.is_empty() {
        format!("/{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// First `NOTE_PREVIEW_CHARS` characters of a note, with an ellipsis when cut.
#[must_use]
pub fn note_preview(content: &str) -> String {
    let mut chars = content.chars();
    let preview: String = chars.by_ref().take(NOTE_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}…")
    } else {
        preview
    }
}

/// Whether a file URL points at a PDF (`.pdf` at the end or before a query).
#[must_use]
pub fn is_pdf(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or_default();
    path.to_ascii_lowercase().ends_with(".pdf")
}

/// Extracts an 11-character YouTube video id.
///
/// Recognizes `youtu.be/<id>`, `watch?v=<id>`, `&v=<id>`, `/embed/<id>` and
/// `/v/<id>`.
///
/// ```
/// use brainbox::ui::viewmodel::youtube_video_id;
///
/// assert_eq!(youtube_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
/// assert_eq!(youtube_video_id("https://www.youtube.com/watch?v=short"), None);
/// ```
#[must_use]
pub fn youtube_video_id(url: &str) -> Option<String> {
    if !(url.contains("youtube.com") || url.contains("youtu.be")) {
        return None;
    }
    const MARKERS: [&str; 5] = ["youtu.be/", "watch?v=", "&v=", "embed/", "v/"];
    MARKERS.iter().find_map(|marker| {
        let (_, rest) = url.rsplit_once(marker)?;
        let id: String = rest.chars().take_while(|c| !matches!(c, '#' | '&' | '?')).collect();
        (id.chars().count() == 11).then_some(id)
    })
}

/// Preview kind for a link or video target.
#[must_use]
pub fn link_preview(url: &str) -> LinkPreview {
    match youtube_video_id(url) {
        Some(video_id) => LinkPreview::YouTube {
            thumbnail: format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg"),
            video_id,
        },
        None => LinkPreview::Generic {
            host: Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(String::from))
                .unwrap_or_default(),
        },
    }
}
