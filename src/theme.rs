//! Theme support for the TUI.
//!
//! Provides a [`ThemeColors`] struct containing all color definitions used
//! by the viewer. Two constructors are provided: [`ThemeColors::dark()`]
//! (the default) and [`ThemeColors::light()`] (adjusted for readability on
//! light backgrounds).
//!
//! Everything uses the 16 basic ANSI palette except the dark theme's match
//! highlight, which is the yellow `#dddd44`.

use ratatui::style::Color;

use crate::cli::Theme;

// ---------------------------------------------------------------------------
// ThemeColors
// ---------------------------------------------------------------------------

/// All color definitions for the TUI, grouped by component.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    // -- Log pane ----------------------------------------------------------
    /// Default text foreground in the log pane.
    pub log_text: Color,
    /// Foreground of search matches.
    pub highlight_fg: Color,

    // -- Status bar --------------------------------------------------------
    /// Status bar background.
    pub status_bar_bg: Color,
    /// Status bar default foreground.
    pub status_bar_fg: Color,
    /// Search prompt (`/`) foreground.
    pub search_prompt: Color,

    // -- Help overlay ------------------------------------------------------
    pub help_border: Color,
    pub help_key: Color,
    pub help_text: Color,
    pub help_bg: Color,
}

impl ThemeColors {
    /// Construct the theme colors from the CLI/config theme enum.
    pub fn from_theme(theme: &Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    /// Dark theme, the default.
    pub fn dark() -> Self {
        Self {
            // Log pane
            log_text: Color::Reset,
            highlight_fg: Color::Rgb(0xdd, 0xdd, 0x44),

            // Status bar
            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            search_prompt: Color::Yellow,

            // Help overlay
            help_border: Color::Cyan,
            help_key: Color::Yellow,
            help_text: Color::White,
            help_bg: Color::Black,
        }
    }

    /// Light theme -- adjusted colors for readability on light terminal
    /// backgrounds.
    pub fn light() -> Self {
        Self {
            // Log pane
            log_text: Color::Reset,
            highlight_fg: Color::Magenta,

            // Status bar
            status_bar_bg: Color::Gray,
            status_bar_fg: Color::Black,
            search_prompt: Color::Blue,

            // Help overlay
            help_border: Color::Blue,
            help_key: Color::Blue,
            help_text: Color::Black,
            help_bg: Color::White,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
