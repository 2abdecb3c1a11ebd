//! Turns one logical line into a bounded block of visual rows.
//!
//! Widths are measured in terminal display columns, not bytes or chars:
//! CJK glyphs take two columns, combining marks take none. Tabs expand to
//! the next multiple of [`TAB_WIDTH`] columns; other control characters are
//! dropped so raw escape bytes never reach the terminal.

use unicode_width::UnicodeWidthChar;

use crate::search::LineRef;

/// Column stop for tab expansion.
pub const TAB_WIDTH: usize = 4;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// How a line wider than the viewport is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// Truncate at the right edge; always one row.
    Hard,
    /// Reflow onto as many rows as needed.
    #[default]
    Soft,
}

impl WrapMode {
    pub fn toggled(self) -> Self {
        match self {
            WrapMode::Hard => WrapMode::Soft,
            WrapMode::Soft => WrapMode::Hard,
        }
    }
}

/// Which end of a reflowed line survives when it has more rows than fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapDirection {
    /// Keep the first rows (pinned rendering walks forward).
    FromHead,
    /// Keep the last rows (tailing rendering walks backward).
    FromTail,
}

// ---------------------------------------------------------------------------
// Visual rows
// ---------------------------------------------------------------------------

/// A run of characters that share a highlight flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// One terminal row of output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualRow {
    pub segments: Vec<Segment>,
    width: usize,
}

impl VisualRow {
    /// Append a character, merging it into the last segment when the
    /// highlight flag matches.
    fn push(&mut self, ch: char, cols: usize, highlighted: bool) {
        match self.segments.last_mut() {
            Some(last) if last.highlighted == highlighted => last.text.push(ch),
            _ => self.segments.push(Segment {
                text: ch.to_string(),
                highlighted,
            }),
        }
        self.width += cols;
    }

    /// Display width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Row text with highlighting dropped.
    pub fn plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// The rows produced for a single logical line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualBlock {
    pub rows: Vec<VisualRow>,
}

impl VisualBlock {
    /// Number of visual rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn plain_rows(&self) -> Vec<String> {
        self.rows.iter().map(VisualRow::plain).collect()
    }
}

// ---------------------------------------------------------------------------
// Wrapping
// ---------------------------------------------------------------------------

/// Accumulates characters into rows of at most `width` columns.
struct RowBuilder {
    width: usize,
    mode: WrapMode,
    rows: Vec<VisualRow>,
    current: VisualRow,
    full: bool,
}

impl RowBuilder {
    fn new(width: usize, mode: WrapMode) -> Self {
        Self {
            width,
            mode,
            rows: Vec::new(),
            current: VisualRow::default(),
            full: false,
        }
    }

    /// Place one glyph. Returns `false` once a hard-wrapped row is full.
    fn push(&mut self, ch: char, cols: usize, highlighted: bool) -> bool {
        if self.full {
            return false;
        }
        // Zero-width marks attach to whatever precedes them.
        if cols > 0 && self.current.width + cols > self.width {
            match self.mode {
                WrapMode::Hard => {
                    self.full = true;
                    return false;
                }
                WrapMode::Soft if !self.current.is_empty() => {
                    let done = std::mem::take(&mut self.current);
                    self.rows.push(done);
                }
                // A glyph wider than the whole row sits alone on it.
                WrapMode::Soft => {}
            }
        }
        self.current.push(ch, cols, highlighted);
        true
    }

    fn finish(mut self) -> Vec<VisualRow> {
        if !self.current.is_empty() || self.rows.is_empty() {
            self.rows.push(self.current);
        }
        self.rows
    }
}

/// Wrap `line` into at most `max_rows` rows of `width` columns.
///
/// Hard mode always yields one row. Soft mode reflows greedily and, when
/// the result has more than `max_rows` rows, keeps the first or last
/// `max_rows` of them according to `direction`. An empty line yields one
/// empty row; `max_rows == 0` or `width == 0` yields an empty block.
pub fn wrap(
    line: LineRef<'_>,
    width: usize,
    max_rows: usize,
    mode: WrapMode,
    direction: WrapDirection,
) -> VisualBlock {
    if max_rows == 0 || width == 0 {
        return VisualBlock::default();
    }

    let mut builder = RowBuilder::new(width, mode);
    let mut span_idx = 0;

    for (offset, ch) in line.text.char_indices() {
        while span_idx < line.spans.len() && line.spans[span_idx].end <= offset {
            span_idx += 1;
        }
        let highlighted = line
            .spans
            .get(span_idx)
            .is_some_and(|span| span.start <= offset);

        let placed = if ch == '\t' {
            let fill = TAB_WIDTH - builder.current.width % TAB_WIDTH;
            (0..fill).all(|_| builder.push(' ', 1, highlighted))
        } else if ch.is_control() {
            true
        } else {
            builder.push(ch, ch.width().unwrap_or(0), highlighted)
        };
        if !placed {
            break;
        }
    }

    let mut rows = builder.finish();
    if rows.len() > max_rows {
        match direction {
            WrapDirection::FromHead => rows.truncate(max_rows),
            WrapDirection::FromTail => {
                rows.drain(..rows.len() - max_rows);
            }
        }
    }
    VisualBlock { rows }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
