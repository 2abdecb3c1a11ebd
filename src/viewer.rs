//! The log viewer model.
//!
//! [`LogView`] owns the line store, search engine, filtered view, scroll
//! controller and composer, and is the only thing that mutates them. All
//! calls happen on the host's event loop thread, one event at a time.

use tracing::debug;

use crate::line_store::LineStore;
use crate::render::{Composer, RenderContext, RenderedFrame, Styles};
use crate::scroll::{ScrollController, ScrollState};
use crate::search::{ActiveView, HighlightedLine, QueryChange, SearchEngine, SearchInput};
use crate::wrap::WrapMode;

// ---------------------------------------------------------------------------
// Options and focus
// ---------------------------------------------------------------------------

/// Construction-time settings.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub show_status_bar: bool,
    pub start_at_head: bool,
    pub wrap_mode: WrapMode,
    pub case_insensitive: bool,
    pub styles: Styles,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            show_status_bar: true,
            start_at_head: false,
            wrap_mode: WrapMode::Soft,
            case_insensitive: false,
            styles: Styles::default(),
        }
    }
}

/// Which part of the viewer receives keyboard input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    LogPane,
    SearchBar,
    Help,
}

// ---------------------------------------------------------------------------
// LogView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LogView {
    store: LineStore,
    engine: SearchEngine,
    filtered: Vec<HighlightedLine>,
    scroll: ScrollController,
    composer: Composer,
    wrap_mode: WrapMode,
    focus: Focus,
    input: SearchInput,
    width: u16,
    height: u16,
}

impl Default for LogView {
    fn default() -> Self {
        Self::new(ViewerOptions::default())
    }
}

impl LogView {
    pub fn new(options: ViewerOptions) -> Self {
        Self {
            store: LineStore::new(),
            engine: SearchEngine::new(options.case_insensitive),
            filtered: Vec::new(),
            scroll: ScrollController::new(options.start_at_head),
            composer: Composer::new(options.styles, options.show_status_bar),
            wrap_mode: options.wrap_mode,
            focus: Focus::LogPane,
            input: SearchInput::default(),
            width: 0,
            height: 0,
        }
    }

    // -- Ingestion -----------------------------------------------------------

    /// Append a chunk of bytes from the source.
    ///
    /// Every line finalized by this chunk is matched against the current
    /// query and, if it matches, appended to the filtered view.
    pub fn ingest(&mut self, chunk: &[u8]) {
        let added = self.store.ingest(chunk);
        if !self.engine.is_active() {
            return;
        }
        for line in &self.store.lines()[added] {
            if let Some(hit) = self.engine.match_line(line) {
                self.filtered.push(hit);
            }
        }
    }

    // -- Search --------------------------------------------------------------

    /// Set the query directly and recompute the filtered view.
    ///
    /// Also mirrors `pattern` into the search bar.
    pub fn set_query(&mut self, pattern: &str) -> QueryChange {
        self.input.set(pattern);
        self.apply_query()
    }

    /// Compile the search bar text as the current query.
    fn apply_query(&mut self) -> QueryChange {
        let change = self.engine.set_query(self.input.text());
        match &change {
            QueryChange::Applied => {
                self.filtered = self.engine.recompute_all(self.store.lines());
                debug!(
                    pattern = self.input.text(),
                    matches = self.filtered.len(),
                    "query applied"
                );
            }
            QueryChange::Cleared => {
                self.filtered.clear();
                debug!("query cleared");
            }
            QueryChange::Invalid(err) => {
                debug!(pattern = self.input.text(), error = %err, "invalid query ignored");
            }
        }
        change
    }

    /// Pattern of the query currently filtering the view, or `""` when
    /// none is set.
    ///
    /// This is the last text that compiled. While the search bar holds an
    /// invalid pattern it differs from [`search_text`](Self::search_text),
    /// which returns the raw input.
    pub fn query(&self) -> &str {
        self.engine.query().map(|q| q.pattern()).unwrap_or("")
    }

    /// Text currently in the search bar.
    pub fn search_text(&self) -> &str {
        self.input.text()
    }

    /// Focus the search bar with an empty input, remembering the current
    /// text for [`cancel_search`](Self::cancel_search).
    pub fn begin_search(&mut self) {
        self.input.start();
        self.focus = Focus::SearchBar;
        self.apply_query();
    }

    pub fn search_input_char(&mut self, ch: char) {
        self.input.on_char(ch);
        self.apply_query();
    }

    /// Delete the last character; on an empty input, leave the search bar.
    pub fn search_input_backspace(&mut self) {
        if self.input.on_backspace() {
            self.apply_query();
        } else {
            self.focus = Focus::LogPane;
        }
    }

    /// Restore the query from before [`begin_search`](Self::begin_search).
    pub fn cancel_search(&mut self) {
        self.input.cancel();
        self.apply_query();
        self.focus = Focus::LogPane;
    }

    pub fn commit_search(&mut self) {
        self.input.commit();
        self.focus = Focus::LogPane;
    }

    // -- Navigation ----------------------------------------------------------

    fn view_len(&self) -> usize {
        active_view(&self.engine, &self.store, &self.filtered).len()
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let len = self.view_len();
        self.scroll.scroll_by(delta, len);
    }

    /// Pin at `index`, or resume tailing with `None`.
    pub fn scroll_to(&mut self, index: Option<usize>) {
        let len = self.view_len();
        self.scroll.scroll_to(index, len);
    }

    fn page_rows(&self) -> isize {
        (self.height as isize - 4).max(0)
    }

    fn half_page_rows(&self) -> isize {
        self.height as isize / 2
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-self.page_rows());
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.page_rows());
    }

    pub fn half_page_up(&mut self) {
        self.scroll_by(-self.half_page_rows());
    }

    pub fn half_page_down(&mut self) {
        self.scroll_by(self.half_page_rows());
    }

    pub fn jump_to_start(&mut self) {
        self.scroll_to(Some(0));
    }

    pub fn jump_to_end(&mut self) {
        self.scroll_to(None);
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.state()
    }

    // -- Display settings ----------------------------------------------------

    pub fn set_dimensions(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        self.wrap_mode = mode;
    }

    pub fn toggle_wrap_mode(&mut self) {
        self.wrap_mode = self.wrap_mode.toggled();
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    pub fn styles(&self) -> &Styles {
        self.composer.styles()
    }

    // -- Output --------------------------------------------------------------

    /// Render a frame of the given size.
    pub fn render(&mut self, width: i32, height: i32) -> RenderedFrame {
        let ctx = RenderContext {
            view: active_view(&self.engine, &self.store, &self.filtered),
            pending: self.store.pending(),
            wrap_mode: self.wrap_mode,
            search_text: self.input.text(),
            search_focused: self.focus == Focus::SearchBar,
        };
        self.composer.render(&ctx, &mut self.scroll, width, height)
    }

    /// Render at the stored dimensions.
    pub fn view(&mut self) -> RenderedFrame {
        self.render(i32::from(self.width), i32::from(self.height))
    }

    /// Every line plus the pending buffer, joined with `\n`.
    pub fn content(&self) -> String {
        self.store.content().join("\n")
    }

    pub fn line_store(&self) -> &LineStore {
        &self.store
    }

    /// The filtered view; empty when no query is set.
    pub fn filtered(&self) -> &[HighlightedLine] {
        &self.filtered
    }

    /// The sequence scrolling and rendering currently operate on.
    pub fn active_view(&self) -> ActiveView<'_> {
        active_view(&self.engine, &self.store, &self.filtered)
    }
}

/// Select the active view from disjoint fields, so callers can still
/// borrow the scroll controller mutably.
fn active_view<'a>(
    engine: &SearchEngine,
    store: &'a LineStore,
    filtered: &'a [HighlightedLine],
) -> ActiveView<'a> {
    if engine.is_active() {
        ActiveView::Filtered(filtered)
    } else {
        ActiveView::Unfiltered(store.lines())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
