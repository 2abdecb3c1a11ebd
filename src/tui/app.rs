//! Application state for the TUI.
//!
//! The [`App`] struct owns the [`LogView`] plus the bits of host state the
//! view does not care about: the quit flag, redraw tracking, the pending
//! half of a two-key chord, and the source failure that ended the session.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::config::AppConfig;
use crate::source::{SourceError, SourceEvent};
use crate::theme::ThemeColors;
use crate::viewer::{Focus, LogView};

// ---------------------------------------------------------------------------
// App struct
// ---------------------------------------------------------------------------

/// Root application state.
///
/// Single-owner, never shared across threads. The event loop owns the
/// `App` and passes a `&mut` reference to key handlers and the draw
/// function.
pub struct App {
    /// The log viewer model.
    pub view: LogView,
    /// Set to `true` to exit the event loop.
    pub should_quit: bool,
    /// Whether anything changed since the last draw.
    pub needs_redraw: bool,
    /// Resolved theme colors derived from `config.theme`.
    pub theme_colors: ThemeColors,
    /// First key of a `gg` chord.
    held_key: Option<char>,
    /// Set when the byte source failed; ends the session.
    pub source_error: Option<SourceError>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            view: LogView::new(config.viewer_options()),
            should_quit: false,
            needs_redraw: true,
            theme_colors: ThemeColors::from_theme(&config.theme),
            held_key: None,
            source_error: None,
        }
    }

    // -- Input ---------------------------------------------------------------

    /// Handle a key press according to the current focus.
    pub fn on_key(&mut self, key: KeyEvent) {
        self.needs_redraw = true;
        match self.view.focus() {
            Focus::Help => self.on_help_key(key),
            Focus::SearchBar => self.on_search_key(key),
            Focus::LogPane => self.on_log_key(key),
        }
    }

    fn on_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc
            | KeyCode::Char('q')
            | KeyCode::Char('h')
            | KeyCode::Char('?') => self.view.set_focus(Focus::LogPane),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.view.set_focus(Focus::LogPane)
            }
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.view.cancel_search(),
            KeyCode::Char('c') if ctrl => self.view.cancel_search(),
            KeyCode::Enter => self.view.commit_search(),
            KeyCode::Backspace => self.view.search_input_backspace(),
            KeyCode::Char(c) if !ctrl => self.view.search_input_char(c),
            _ => {}
        }
    }

    fn on_log_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let held = self.held_key.take();

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') if ctrl => self.should_quit = true,
            KeyCode::Char('u') if ctrl => self.view.half_page_up(),
            KeyCode::Char('d') if ctrl => self.view.half_page_down(),
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('w') => self.view.toggle_wrap_mode(),
            KeyCode::Char('/') => self.view.begin_search(),
            KeyCode::Char('?') => self.view.set_focus(Focus::Help),
            KeyCode::Up | KeyCode::Char('k') => self.view.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.view.scroll_by(1),
            KeyCode::PageUp => self.view.page_up(),
            KeyCode::PageDown => self.view.page_down(),
            KeyCode::Home => self.view.jump_to_start(),
            KeyCode::End | KeyCode::Char('G') => self.view.jump_to_end(),
            KeyCode::Char('g') => {
                if held == Some('g') {
                    self.view.jump_to_start();
                } else {
                    self.held_key = Some('g');
                }
            }
            _ => {}
        }
    }

    /// Scroll on wheel events; everything else is ignored.
    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.view.scroll_by(-1),
            MouseEventKind::ScrollDown => self.view.scroll_by(1),
            _ => return,
        }
        self.needs_redraw = true;
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.view.set_dimensions(width, height);
        self.needs_redraw = true;
    }

    // -- Source --------------------------------------------------------------

    /// Feed a chunk to the viewer, or record a failure and quit.
    pub fn on_source_event(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Chunk(bytes) => {
                self.view.ingest(&bytes);
                self.needs_redraw = true;
            }
            SourceEvent::Error(e) => {
                self.source_error = Some(e);
                self.should_quit = true;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
