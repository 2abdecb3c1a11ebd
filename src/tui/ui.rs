//! Layout and rendering for the TUI.
//!
//! The viewer composes the frame itself; this module only places it:
//! - **Log pane** (fills the terminal): the rows of the rendered frame
//! - **Status line** (bottom, height 1): position and search prompt, when shown
//! - **Help overlay** (centered popup) while help has focus

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::theme::ThemeColors;
use crate::tui::app::App;
use crate::viewer::Focus;

/// Shortcut entries shown in the help overlay: (key_text, description)
const SHORTCUTS: &[(&str, &str)] = &[
    ("q / Esc", "Quit"),
    ("j / Down", "Scroll down one line"),
    ("k / Up", "Scroll up one line"),
    ("PgDn / PgUp", "Scroll one page"),
    ("Ctrl+D / U", "Scroll half a page"),
    ("gg / Home", "Jump to the first line"),
    ("G / End", "Follow the end of the log"),
    ("/", "Search (regex)"),
    ("w", "Toggle line wrapping"),
    ("?", "Show this help"),
];

// ---------------------------------------------------------------------------
// Main draw function
// ---------------------------------------------------------------------------

/// Draw the entire TUI frame.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    app.view.set_dimensions(size.width, size.height);
    let rendered = app.view.render(i32::from(size.width), i32::from(size.height));

    match rendered.status {
        Some(status) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(size);
            draw_log_pane(frame, app, rendered.log_rows, chunks[0]);
            draw_status_line(frame, app, status, chunks[1]);
        }
        None => draw_log_pane(frame, app, rendered.log_rows, size),
    }

    if app.view.focus() == Focus::Help {
        draw_help_overlay(frame, &app.theme_colors, size);
    }
}

fn draw_log_pane(frame: &mut Frame, app: &App, rows: Vec<Line<'static>>, area: Rect) {
    let paragraph = Paragraph::new(rows).style(app.view.styles().log);
    frame.render_widget(paragraph, area);
}

fn draw_status_line(frame: &mut Frame, app: &App, status: Line<'static>, area: Rect) {
    let paragraph = Paragraph::new(status).style(app.view.styles().status_bar);
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Help overlay
// ---------------------------------------------------------------------------

/// Draw the help overlay modal showing all keyboard shortcuts.
fn draw_help_overlay(frame: &mut Frame, theme: &ThemeColors, area: Rect) {
    // Bail out if the terminal is too small to render anything.
    if area.width < 5 || area.height < 5 {
        return;
    }

    let content_width: u16 = 40;
    let overlay_width = (content_width + 4).min(area.width);
    // title + blank + shortcuts + blank + footer, plus borders
    let content_lines = SHORTCUTS.len() as u16 + 4;
    let overlay_height = (content_lines + 2).min(area.height);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.help_border));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        " Keyboard Shortcuts",
        Style::default()
            .fg(theme.help_text)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    for (key, desc) in SHORTCUTS {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:14}", key),
                Style::default()
                    .fg(theme.help_key)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(desc.to_string(), Style::default().fg(theme.help_text)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Esc, q, h or ? to close",
        Style::default()
            .fg(theme.help_text)
            .add_modifier(Modifier::DIM),
    )));

    let paragraph = Paragraph::new(lines).style(Style::default().bg(theme.help_bg).fg(theme.help_text));
    frame.render_widget(paragraph, inner);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
