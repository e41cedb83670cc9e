//! Plain-text rendering of a [`UIViewModel`].
//!
//! The renderer follows a two-step process:
//!
//! 1. **View Model Computation**: `AppState::compute_viewmodel`
//! 2. **Section Rendering**: header, navigation, status, cards, footer
//!
//! Output goes to any [`Write`] so the CLI can print to stdout and tests can
//! render into a buffer. With `ansi` enabled, query matches in titles are shown
//! in bold; otherwise they are wrapped in brackets.

use crate::app::AppState;
use crate::ui::viewmodel::{Card, CardBody, LinkPreview, UIViewModel, NO_FILE_LABEL};
use std::io::{self, Write};

const BOLD: &str = "\u{1b}[1m";
const DIM: &str = "\u{1b}[2m";
const RESET: &str = "\u{1b}[0m";

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit ANSI escape sequences.
    pub ansi: bool,
}

/// Renders the current page of `state`.
///
/// # Errors
///
/// Returns any error raised by the writer.
pub fn render<W: Write>(state: &AppState, out: &mut W, options: RenderOptions) -> io::Result<()> {
    let viewmodel = state.compute_viewmodel();
    render_viewmodel(&viewmodel, out, options)
}

/// Renders a pre-computed view model.
///
/// # Errors
///
/// Returns any error raised by the writer.
pub fn render_viewmodel<W: Write>(
    vm: &UIViewModel,
    out: &mut W,
    options: RenderOptions,
) -> io::Result<()> {
    let styled = |code: &'static str| if options.ansi { code } else { "" };

    writeln!(out, "{}{}{}", styled(BOLD), vm.header.title, styled(RESET))?;

    if !vm.nav.is_empty() {
        let entries: Vec<String> = vm
            .nav
            .iter()
            .map(|entry| {
                let marker = if entry.is_active { "*" } else { "" };
                format!("{marker}{} ({})", entry.kind, entry.count)
            })
            .collect();
        writeln!(out, "{}", entries.join("  "))?;
    }

    if !vm.sub_nav.is_empty() {
        let entries: Vec<String> = vm
            .sub_nav
            .iter()
            .map(|entry| {
                if entry.is_active {
                    format!("*{}", entry.key)
                } else {
                    entry.key.clone()
                }
            })
            .collect();
        writeln!(out, "  {}", entries.join("  "))?;
    }

    if let Some(search) = &vm.search_bar {
        writeln!(out, "search: {} [{:?}]", search.query, search.phase)?;
    }

    render_status(vm, out)?;

    if let Some(empty) = &vm.empty_state {
        writeln!(out)?;
        writeln!(out, "{}", empty.message)?;
        writeln!(out, "{}{}{}", styled(DIM), empty.subtitle, styled(RESET))?;
    } else {
        for card in &vm.cards {
            writeln!(out)?;
            render_card(card, out, options)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "page {}/{}  ({} items, {} per page)",
        vm.footer.page, vm.footer.total_pages, vm.footer.total, vm.footer.page_size
    )
}

fn render_status<W: Write>(vm: &UIViewModel, out: &mut W) -> io::Result<()> {
    let status = &vm.status;
    if status.loading {
        writeln!(out, "loading…")?;
    }
    if status.searching {
        writeln!(out, "searching…")?;
    }
    for error in [&status.store_error, &status.search_error].into_iter().flatten() {
        writeln!(out, "error: {error}")?;
    }
    if let Some(notice) = &status.notice {
        writeln!(out, "{notice}")?;
    }
    Ok(())
}

fn render_card<W: Write>(card: &Card, out: &mut W, options: RenderOptions) -> io::Result<()> {
    write!(out, "{:>3}. [{}] ", card.position + 1, card.kind)?;
    write!(out, "{}", highlight(&card.title, &card.title_highlights, options))?;
    if let Some(label) = card.match_label {
        write!(out, "  ({})", label.as_str())?;
    }
    writeln!(out, "  #{}", card.id)?;

    match &card.body {
        CardBody::Note { preview } => {
            if !preview.is_empty() {
                writeln!(out, "     {preview}")?;
            }
        }
        CardBody::Link { url, preview } | CardBody::Video { url, preview } => {
            writeln!(out, "     {url}")?;
            if let LinkPreview::YouTube { thumbnail, .. } = preview {
                writeln!(out, "     thumbnail: {thumbnail}")?;
            }
        }
        CardBody::Document { file: Some(file) } => {
            let kind = if file.is_pdf { "pdf" } else { "file" };
            writeln!(out, "     {kind}: {}", file.url)?;
        }
        CardBody::Document { file: None } => writeln!(out, "     {NO_FILE_LABEL}")?,
    }

    if !card.tags.is_empty() {
        writeln!(out, "     tags: {}", card.tags.join(", "))?;
    }
    Ok(())
}

/// Wraps the character ranges of `text` in highlight markers.
///
/// Ranges are character indices with an exclusive end; out-of-range ends are
/// clamped.
#[must_use]
pub fn highlight(text: &str, ranges: &[(usize, usize)], options: RenderOptions) -> String {
    if ranges.is_empty() {
        return text.to_string();
    }
    let (open, close) = if options.ansi { (BOLD, RESET) } else { ("[", "]") };
    let chars: Vec<char> = text.chars().collect();
    let mut rendered = String::with_capacity(text.len() + ranges.len() * 4);
    let mut current = 0;

    for &(start, end) in ranges {
        let start = start.clamp(current, chars.len());
        let end = end.clamp(start, chars.len());
        rendered.extend(&chars[current..start]);
        if start < end {
            rendered.push_str(open);
            rendered.extend(&chars[start..end]);
            rendered.push_str(close);
        }
        current = end;
    }
    rendered.extend(&chars[current..]);
    rendered
}
