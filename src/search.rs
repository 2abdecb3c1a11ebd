//! Search input, regex matching engine, and the filtered view types.
//!
//! A query is a regular expression. While a query is set, only lines with
//! at least one match are shown, and every match inside them is
//! highlighted. Matches are found left-to-right and never overlap: each
//! search resumes after the previous match ends.
//!
//! Typing in the search bar re-applies the query on every edit. An invalid
//! pattern (e.g. an unclosed group halfway through typing) leaves the
//! previous query in place.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

// ---------------------------------------------------------------------------
// Highlighted lines
// ---------------------------------------------------------------------------

/// A line that matched the current query, with the byte ranges of each
/// match.
///
/// Owns its text: the filtered view never borrows from the line store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedLine {
    pub text: String,
    /// Non-empty, ordered, non-overlapping byte ranges into `text`.
    pub spans: Vec<Range<usize>>,
}

impl HighlightedLine {
    pub fn as_line_ref(&self) -> LineRef<'_> {
        LineRef {
            text: &self.text,
            spans: &self.spans,
        }
    }

    /// The matched substrings, in order.
    pub fn matched_text(&self) -> Vec<&str> {
        self.spans.iter().map(|r| &self.text[r.clone()]).collect()
    }
}

/// Borrowed view of one logical line and its highlight spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef<'a> {
    pub text: &'a str,
    pub spans: &'a [Range<usize>],
}

impl<'a> LineRef<'a> {
    /// A line with no highlighting.
    pub fn plain(text: &'a str) -> Self {
        Self { text, spans: &[] }
    }
}

// ---------------------------------------------------------------------------
// Active view
// ---------------------------------------------------------------------------

/// The sequence that scrolling and rendering operate on: every line when
/// no query is set, otherwise only the matching lines.
#[derive(Debug, Clone, Copy)]
pub enum ActiveView<'a> {
    Unfiltered(&'a [String]),
    Filtered(&'a [HighlightedLine]),
}

impl<'a> ActiveView<'a> {
    pub fn len(&self) -> usize {
        match self {
            ActiveView::Unfiltered(lines) => lines.len(),
            ActiveView::Filtered(lines) => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<LineRef<'a>> {
        match *self {
            ActiveView::Unfiltered(lines) => lines.get(index).map(|l| LineRef::plain(l)),
            ActiveView::Filtered(lines) => lines.get(index).map(HighlightedLine::as_line_ref),
        }
    }

    /// Plain text of every entry, highlights dropped.
    pub fn texts(&self) -> Vec<&'a str> {
        match *self {
            ActiveView::Unfiltered(lines) => lines.iter().map(String::as_str).collect(),
            ActiveView::Filtered(lines) => lines.iter().map(|l| l.text.as_str()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Search engine
// ---------------------------------------------------------------------------

/// A compiled query together with the text it was compiled from.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pattern: String,
    regex: Regex,
}

impl SearchQuery {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Outcome of [`SearchEngine::set_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryChange {
    /// A new pattern compiled and replaced the previous query.
    Applied,
    /// The pattern was empty; filtering is off.
    Cleared,
    /// The pattern did not compile; the previous query is still active.
    Invalid(String),
}

/// Compiles queries and classifies lines against the current one.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    query: Option<SearchQuery>,
    case_insensitive: bool,
}

impl SearchEngine {
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            query: None,
            case_insensitive,
        }
    }

    /// Replace the current query.
    ///
    /// Never fails: invalid syntax is reported through the return value
    /// and otherwise ignored.
    pub fn set_query(&mut self, pattern: &str) -> QueryChange {
        if pattern.is_empty() {
            self.query = None;
            return QueryChange::Cleared;
        }

        match RegexBuilder::new(pattern)
            .case_insensitive(self.case_insensitive)
            .build()
        {
            Ok(regex) => {
                self.query = Some(SearchQuery {
                    pattern: pattern.to_string(),
                    regex,
                });
                QueryChange::Applied
            }
            Err(e) => QueryChange::Invalid(e.to_string()),
        }
    }

    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    /// Whether a query is set (and so the filtered view is active).
    pub fn is_active(&self) -> bool {
        self.query.is_some()
    }

    /// Highlight every match in `line`.
    ///
    /// Returns `None` when no query is set or the line has no match.
    pub fn match_line(&self, line: &str) -> Option<HighlightedLine> {
        let query = self.query.as_ref()?;
        let mut matched = false;
        let mut spans = Vec::new();
        for m in query.regex.find_iter(line) {
            matched = true;
            // Empty matches count for filtering but have nothing to mark.
            if !m.range().is_empty() {
                spans.push(m.range());
            }
        }
        matched.then(|| HighlightedLine {
            text: line.to_string(),
            spans,
        })
    }

    /// Classify every line, keeping the matches in order.
    pub fn recompute_all<S: AsRef<str>>(&self, lines: &[S]) -> Vec<HighlightedLine> {
        if self.query.is_none() {
            return Vec::new();
        }
        lines
            .iter()
            .filter_map(|line| self.match_line(line.as_ref()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Search input
// ---------------------------------------------------------------------------

/// Text being edited in the search bar.
///
/// `previous` remembers the query that was active when editing began, so
/// that cancelling can put it back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInput {
    buffer: String,
    previous: String,
}

impl SearchInput {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Start a fresh edit: remember the current text, then clear it.
    pub fn start(&mut self) {
        self.previous = std::mem::take(&mut self.buffer);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Replace the text outright.
    pub fn set(&mut self, text: &str) {
        self.buffer.clear();
        self.buffer.push_str(text);
    }

    pub fn on_char(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    /// Remove the last character. Returns `false` if there was none.
    pub fn on_backspace(&mut self) -> bool {
        self.buffer.pop().is_some()
    }

    /// Abandon the edit and restore the text from before [`start`].
    ///
    /// [`start`]: SearchInput::start
    pub fn cancel(&mut self) {
        self.buffer = std::mem::take(&mut self.previous);
    }

    /// Keep the edited text.
    pub fn commit(&mut self) {
        self.previous.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
