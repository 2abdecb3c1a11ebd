//! Composes a frame: the wrapped window of the active view plus an
//! optional one-row status line.
//!
//! Two walks fill the log pane. While tailing, the composer starts from
//! the newest content (the pending buffer first) and walks backward,
//! keeping the tail of each wrapped line, then pads the top with blank
//! rows. While pinned, it starts at the pinned line and walks forward,
//! keeping the head of each wrapped line, with no padding.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::scroll::{ScrollController, ScrollState};
use crate::search::{ActiveView, LineRef};
use crate::theme::ThemeColors;
use crate::wrap::{wrap, VisualBlock, VisualRow, WrapDirection, WrapMode};

/// Gap between the position and the search prompt in the status line.
const STATUS_GAP: &str = "    ";

/// Prompt shown before the query in the status line.
pub const SEARCH_PROMPT: &str = "/";

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

/// Styles applied by the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Styles {
    pub log: Style,
    pub status_bar: Style,
    pub highlight: Style,
    pub search_prompt: Style,
}

impl Styles {
    pub fn from_theme(colors: &ThemeColors) -> Self {
        Self {
            log: Style::default().fg(colors.log_text),
            status_bar: Style::default()
                .fg(colors.status_bar_fg)
                .bg(colors.status_bar_bg),
            highlight: Style::default().fg(colors.highlight_fg),
            search_prompt: Style::default().fg(colors.search_prompt),
        }
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::from_theme(&ThemeColors::dark())
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Output of one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedFrame {
    pub log_rows: Vec<Line<'static>>,
    pub status: Option<Line<'static>>,
}

impl RenderedFrame {
    pub fn is_empty(&self) -> bool {
        self.log_rows.is_empty() && self.status.is_none()
    }

    /// Log pane rows as plain text.
    pub fn plain_rows(&self) -> Vec<String> {
        self.log_rows.iter().map(line_text).collect()
    }

    /// Status line as plain text, if shown.
    pub fn status_text(&self) -> Option<String> {
        self.status.as_ref().map(line_text)
    }
}

fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

/// Everything the composer reads from the viewer for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub view: ActiveView<'a>,
    pub pending: &'a str,
    pub wrap_mode: WrapMode,
    /// Text in the search bar.
    pub search_text: &'a str,
    pub search_focused: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    styles: Styles,
    show_status_bar: bool,
}

impl Composer {
    pub fn new(styles: Styles, show_status_bar: bool) -> Self {
        Self {
            styles,
            show_status_bar,
        }
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn show_status_bar(&self) -> bool {
        self.show_status_bar
    }

    /// Render a `width` x `height` frame.
    ///
    /// Records the first displayed index on `scroll`, and re-clamps a
    /// pinned index against the current view length.
    pub fn render(
        &self,
        ctx: &RenderContext<'_>,
        scroll: &mut ScrollController,
        width: i32,
        height: i32,
    ) -> RenderedFrame {
        if width <= 0 || height <= 0 {
            return RenderedFrame::default();
        }
        let width = width as usize;
        let height = height as usize;

        let with_status = self.show_status_bar && height >= 2;
        let log_height = if with_status { height - 1 } else { height };

        scroll.clamp_to(ctx.view.len());
        let rows = match scroll.state() {
            ScrollState::Tailing => self.walk_backward(ctx, scroll, width, log_height),
            ScrollState::Pinned(index) => {
                scroll.set_first_displayed(index);
                self.walk_forward(ctx, index, width, log_height)
            }
        };

        let status = with_status.then(|| self.status_line(ctx, scroll, width));
        RenderedFrame {
            log_rows: rows,
            status,
        }
    }

    fn walk_backward(
        &self,
        ctx: &RenderContext<'_>,
        scroll: &mut ScrollController,
        width: usize,
        target: usize,
    ) -> Vec<Line<'static>> {
        let mut blocks: Vec<VisualBlock> = Vec::new();
        let mut remaining = target;
        let tail_wrap = |line: LineRef<'_>, max_rows: usize| {
            wrap(line, width, max_rows, ctx.wrap_mode, WrapDirection::FromTail)
        };

        if !ctx.pending.is_empty() {
            let block = tail_wrap(LineRef::plain(ctx.pending), remaining);
            remaining -= block.height();
            blocks.push(block);
        }

        let mut pointer = ctx.view.len();
        while remaining > 0 && pointer > 0 {
            pointer -= 1;
            let Some(line) = ctx.view.get(pointer) else {
                break;
            };
            let block = tail_wrap(line, remaining);
            remaining -= block.height();
            blocks.push(block);
        }
        scroll.set_first_displayed(pointer);

        let mut rows: Vec<Line<'static>> = Vec::with_capacity(target);
        rows.extend((0..remaining).map(|_| Line::default()));
        for block in blocks.iter().rev() {
            rows.extend(block.rows.iter().map(|row| self.style_row(row)));
        }
        rows
    }

    fn walk_forward(
        &self,
        ctx: &RenderContext<'_>,
        start: usize,
        width: usize,
        target: usize,
    ) -> Vec<Line<'static>> {
        let mut rows: Vec<Line<'static>> = Vec::with_capacity(target);
        let head_wrap = |line: LineRef<'_>, max_rows: usize| {
            wrap(line, width, max_rows, ctx.wrap_mode, WrapDirection::FromHead)
        };

        let mut pointer = start;
        while rows.len() < target {
            let Some(line) = ctx.view.get(pointer) else {
                break;
            };
            let block = head_wrap(line, target - rows.len());
            rows.extend(block.rows.iter().map(|row| self.style_row(row)));
            pointer += 1;
        }

        if rows.len() < target && !ctx.pending.is_empty() {
            let block = head_wrap(LineRef::plain(ctx.pending), target - rows.len());
            rows.extend(block.rows.iter().map(|row| self.style_row(row)));
        }
        rows
    }

    fn style_row(&self, row: &VisualRow) -> Line<'static> {
        let spans: Vec<Span<'static>> = row
            .segments
            .iter()
            .map(|seg| {
                let style = if seg.highlighted {
                    self.styles.highlight
                } else {
                    self.styles.log
                };
                Span::styled(seg.text.clone(), style)
            })
            .collect();
        Line::from(spans)
    }

    fn status_line(
        &self,
        ctx: &RenderContext<'_>,
        scroll: &ScrollController,
        width: usize,
    ) -> Line<'static> {
        let mut parts: Vec<(String, Style)> = Vec::new();

        if let Some(position) = scroll.position() {
            let count = ctx.view.len() + usize::from(!ctx.pending.is_empty());
            parts.push((format!("{} of {}", position + 1, count), Style::default()));
            parts.push((STATUS_GAP.to_string(), Style::default()));
        }

        if !ctx.search_text.is_empty() || ctx.search_focused {
            parts.push((SEARCH_PROMPT.to_string(), self.styles.search_prompt));
            parts.push((ctx.search_text.to_string(), Style::default()));
            if ctx.search_focused {
                parts.push((
                    " ".to_string(),
                    Style::default().add_modifier(Modifier::REVERSED),
                ));
            }
        }

        Line::from(truncate_parts(parts, width)).style(self.styles.status_bar)
    }
}

/// Cut styled parts down to `width` display columns.
fn truncate_parts(parts: Vec<(String, Style)>, width: usize) -> Vec<Span<'static>> {
    let mut used = 0;
    let mut spans = Vec::with_capacity(parts.len());
    for (text, style) in parts {
        let mut kept = String::new();
        for ch in text.chars() {
            let cols = ch.width().unwrap_or(0);
            if used + cols > width {
                break;
            }
            used += cols;
            kept.push(ch);
        }
        let cut = kept.len() < text.len();
        if !kept.is_empty() {
            spans.push(Span::styled(kept, style));
        }
        if cut {
            break;
        }
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchEngine;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    fn ctx<'a>(view: ActiveView<'a>, pending: &'a str) -> RenderContext<'a> {
        RenderContext {
            view,
            pending,
            wrap_mode: WrapMode::Soft,
            search_text: "",
            search_focused: false,
        }
    }

    fn composer(status: bool) -> Composer {
        Composer::new(Styles::default(), status)
    }

    // -- Degenerate ----------------------------------------------------------

    #[test]
    fn test_zero_or_negative_size_is_empty() {
        let store = lines(&["a"]);
        let c = ctx(ActiveView::Unfiltered(&store), "");
        let mut sc = ScrollController::default();
        for (w, h) in [(0, 5), (5, 0), (-1, 5), (5, -3)] {
            assert!(composer(true).render(&c, &mut sc, w, h).is_empty());
        }
    }

    // -- Tailing -------------------------------------------------------------

    #[test]
    fn test_tailing_pads_top_and_shows_pending_last() {
        let store = lines(&["a", "b"]);
        let c = ctx(ActiveView::Unfiltered(&store), "c");
        let mut sc = ScrollController::default();
        let frame = composer(false).render(&c, &mut sc, 10, 4);
        assert_eq!(frame.plain_rows(), vec!["", "a", "b", "c"]);
        assert!(frame.status.is_none());
        assert_eq!(sc.first_displayed(), 0);
    }

    #[test]
    fn test_tailing_shows_newest_lines_when_overfull() {
        let store = lines(&["1", "2", "3", "4", "5"]);
        let c = ctx(ActiveView::Unfiltered(&store), "");
        let mut sc = ScrollController::default();
        let frame = composer(false).render(&c, &mut sc, 10, 3);
        assert_eq!(frame.plain_rows(), vec!["3", "4", "5"]);
        assert_eq!(sc.first_displayed(), 2);
    }

    #[test]
    fn test_tailing_clips_oldest_wrapped_line_from_tail() {
        let store = lines(&["aaabbbccc", "z"]);
        let c = ctx(ActiveView::Unfiltered(&store), "");
        let mut sc = ScrollController::default();
        let frame = composer(false).render(&c, &mut sc, 3, 3);
        assert_eq!(frame.plain_rows(), vec!["bbb", "ccc", "z"]);
    }

    #[test]
    fn test_tailing_pending_fills_viewport() {
        let store = lines(&["old"]);
        let c = ctx(ActiveView::Unfiltered(&store), "abcdef");
        let mut sc = ScrollController::default();
        let frame = composer(false).render(&c, &mut sc, 3, 2);
        assert_eq!(frame.plain_rows(), vec!["abc", "def"]);
        // No logical line was painted.
        assert_eq!(sc.first_displayed(), 1);
    }

    // -- Pinned --------------------------------------------------------------

    #[test]
    fn test_pinned_walks_forward_without_padding() {
        let store = lines(&["1", "2", "3", "4", "5"]);
        let c = ctx(ActiveView::Unfiltered(&store), "");
        let mut sc = ScrollController::default();
        sc.scroll_to(Some(3), store.len());
        let frame = composer(false).render(&c, &mut sc, 10, 4);
        assert_eq!(frame.plain_rows(), vec!["4", "5"]);
        assert_eq!(sc.first_displayed(), 3);
    }

    #[test]
    fn test_pinned_includes_pending_after_lines() {
        let store = lines(&["a", "b"]);
        let c = ctx(ActiveView::Unfiltered(&store), "c");
        let mut sc = ScrollController::new(true);
        let frame = composer(false).render(&c, &mut sc, 10, 5);
        assert_eq!(frame.plain_rows(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pinned_clips_last_line_from_head() {
        let store = lines(&["x", "aaabbbccc"]);
        let c = ctx(ActiveView::Unfiltered(&store), "");
        let mut sc = ScrollController::new(true);
        let frame = composer(false).render(&c, &mut sc, 3, 2);
        assert_eq!(frame.plain_rows(), vec!["x", "aaa"]);
    }

    #[test]
    fn test_pinned_reclamps_when_view_shrinks() {
        let store = lines(&["a", "b"]);
        let c = ctx(ActiveView::Unfiltered(&store), "");
        let mut sc = ScrollController::default();
        sc.scroll_to(Some(9), 100);
        let frame = composer(false).render(&c, &mut sc, 10, 3);
        assert_eq!(sc.state(), ScrollState::Pinned(1));
        assert_eq!(frame.plain_rows(), vec!["b"]);
    }

    #[test]
    fn test_pinned_empty_view_starts_at_pending() {
        let store: Vec<String> = Vec::new();
        let c = ctx(ActiveView::Unfiltered(&store), "partial");
        let mut sc = ScrollController::new(true);
        let frame = composer(false).render(&c, &mut sc, 10, 3);
        assert_eq!(frame.plain_rows(), vec!["partial"]);
    }

    // -- Status line ---------------------------------------------------------

    #[test]
    fn test_status_line_takes_last_row() {
        let store = lines(&["1", "2", "3"]);
        let c = ctx(ActiveView::Unfiltered(&store), "");
        let mut sc = ScrollController::default();
        let frame = composer(true).render(&c, &mut sc, 10, 3);
        assert_eq!(frame.log_rows.len(), 2);
        assert_eq!(frame.plain_rows(), vec!["2", "3"]);
        assert_eq!(frame.status_text().as_deref(), Some(""));
    }

    #[test]
    fn test_status_line_dropped_when_too_short() {
        let store = lines(&["1", "2"]);
        let c = ctx(ActiveView::Unfiltered(&store), "");
        let mut sc = ScrollController::default();
        let frame = composer(true).render(&c, &mut sc, 10, 1);
        assert_eq!(frame.plain_rows(), vec!["2"]);
        assert!(frame.status.is_none());
    }

    #[test]
    fn test_status_position_counts_pending() {
        let store = lines(&["a", "b"]);
        let c = ctx(ActiveView::Unfiltered(&store), "c");
        let mut sc = ScrollController::default();
        sc.scroll_to(Some(1), store.len());
        let frame = composer(true).render(&c, &mut sc, 40, 5);
        assert_eq!(frame.status_text().as_deref(), Some("2 of 3    "));
    }

    #[test]
    fn test_status_shows_query_and_gap() {
        let mut engine = SearchEngine::default();
        engine.set_query("b");
        let store = lines(&["a", "b"]);
        let filtered = engine.recompute_all(&store);
        let mut c = ctx(ActiveView::Filtered(&filtered), "");
        c.search_text = "b";
        let mut sc = ScrollController::new(true);
        let frame = composer(true).render(&c, &mut sc, 40, 5);
        assert_eq!(frame.status_text().as_deref(), Some("1 of 1    /b"));
    }

    #[test]
    fn test_status_focused_search_shows_prompt_and_cursor() {
        let store: Vec<String> = Vec::new();
        let mut c = ctx(ActiveView::Unfiltered(&store), "");
        c.search_focused = true;
        let mut sc = ScrollController::default();
        let frame = composer(true).render(&c, &mut sc, 40, 5);
        assert_eq!(frame.status_text().as_deref(), Some("/ "));
    }

    #[test]
    fn test_status_truncated_to_width() {
        let store = lines(&["a"]);
        let mut c = ctx(ActiveView::Unfiltered(&store), "");
        c.search_text = "a-very-long-query";
        let mut sc = ScrollController::new(true);
        let frame = composer(true).render(&c, &mut sc, 12, 3);
        assert_eq!(frame.status_text().as_deref(), Some("1 of 1    /a"));
    }

    #[test]
    fn test_empty_log_has_empty_pane_and_no_position() {
        let store: Vec<String> = Vec::new();
        let c = ctx(ActiveView::Unfiltered(&store), "");
        let mut sc = ScrollController::default();
        let frame = composer(true).render(&c, &mut sc, 20, 4);
        assert!(frame.plain_rows().iter().all(String::is_empty));
        assert_eq!(frame.status_text().as_deref(), Some(""));
    }

    // -- Styling -------------------------------------------------------------

    #[test]
    fn test_highlight_style_applied_to_match() {
        let mut engine = SearchEngine::default();
        engine.set_query("error");
        let store = lines(&["error: disk full"]);
        let filtered = engine.recompute_all(&store);
        let c = ctx(ActiveView::Filtered(&filtered), "");
        let mut sc = ScrollController::default();
        let styles = Styles::default();
        let frame = composer(false).render(&c, &mut sc, 40, 1);

        let spans = &frame.log_rows[0].spans;
        assert_eq!(spans[0].content, "error");
        assert_eq!(spans[0].style, styles.highlight);
        assert_eq!(spans[1].content, ": disk full");
        assert_eq!(spans[1].style, styles.log);
    }

    #[test]
    fn test_default_highlight_color() {
        use ratatui::style::Color;
        assert_eq!(
            Styles::default().highlight.fg,
            Some(Color::Rgb(0xdd, 0xdd, 0x44))
        );
    }
}
