//! Scroll position state machine.
//!
//! The viewer is either following the end of the log (`Tailing`) or held at
//! a fixed logical line (`Pinned`). Any relative movement out of tailing
//! starts from the line that was last painted at the top, so the screen
//! does not jump when the user first presses a key.

/// Where the viewport is anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollState {
    /// Follow new content; the newest line is at the bottom.
    #[default]
    Tailing,
    /// The given index of the active view is the top line.
    Pinned(usize),
}

impl ScrollState {
    pub fn is_tailing(&self) -> bool {
        matches!(self, ScrollState::Tailing)
    }
}

/// Owns the scroll state and the index most recently painted at the top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollController {
    state: ScrollState,
    first_displayed: usize,
}

impl ScrollController {
    /// Start tailing, or pinned at the first line when `start_at_head`.
    pub fn new(start_at_head: bool) -> Self {
        let state = if start_at_head {
            ScrollState::Pinned(0)
        } else {
            ScrollState::Tailing
        };
        Self {
            state,
            first_displayed: 0,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// The pinned index, or `None` while tailing.
    pub fn position(&self) -> Option<usize> {
        match self.state {
            ScrollState::Tailing => None,
            ScrollState::Pinned(index) => Some(index),
        }
    }

    /// Index recorded by the last render.
    pub fn first_displayed(&self) -> usize {
        self.first_displayed
    }

    pub fn set_first_displayed(&mut self, index: usize) {
        self.first_displayed = index;
    }

    /// Move by `delta` lines within a view of `len` lines.
    ///
    /// From `Tailing` this first pins at the first displayed line.
    pub fn scroll_by(&mut self, delta: isize, len: usize) {
        let base = match self.state {
            ScrollState::Tailing => self.first_displayed,
            ScrollState::Pinned(index) => index,
        };
        let target = base.saturating_add_signed(delta);
        self.state = ScrollState::Pinned(clamp_index(target, len));
    }

    /// Pin at `index`, or resume tailing with `None`.
    pub fn scroll_to(&mut self, index: Option<usize>, len: usize) {
        self.state = match index {
            Some(index) => ScrollState::Pinned(clamp_index(index, len)),
            None => ScrollState::Tailing,
        };
    }

    /// Re-clamp a pinned index after the active view shrank.
    pub fn clamp_to(&mut self, len: usize) {
        if let ScrollState::Pinned(index) = self.state {
            self.state = ScrollState::Pinned(clamp_index(index, len));
        }
    }
}

/// Clamp to `[0, len - 1]`; an empty view clamps to 0.
pub fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
