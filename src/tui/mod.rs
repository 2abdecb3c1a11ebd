//! TUI module for logtail.
//!
//! Provides the interactive terminal user interface built on `ratatui`
//! and `crossterm`. The entry point is [`run_tui`], which takes over
//! the terminal, runs the event loop, and restores the terminal on exit
//! (including panics).

pub mod app;
pub mod event;
pub mod ui;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::AppConfig;
use crate::source::{self, SourceError, SourceEvent, SourceSpec};
use app::App;
use event::{drain_source_events, poll_crossterm_event, AppEvent};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// How long to wait for a crossterm event before emitting a Tick.
const TICK_RATE: Duration = Duration::from_millis(100);

/// Maximum number of source events to drain per tick.
const MAX_DRAIN_PER_TICK: usize = 200;

/// Capacity of the source channel.
const SOURCE_CHANNEL_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Exit reason
// ---------------------------------------------------------------------------

/// Why the event loop stopped.
#[derive(Debug)]
pub enum ExitReason {
    /// The user quit (or an external signal asked us to).
    Quit,
    /// The byte source failed.
    SourceFailed(SourceError),
}

// ---------------------------------------------------------------------------
// Terminal setup / teardown
// ---------------------------------------------------------------------------

/// Set up the terminal for TUI mode: raw mode, alternate screen, mouse capture.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the
/// panic message. Without this, a panic leaves the terminal in raw mode
/// and the alternate screen, making the shell unusable.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restore; ignore errors.
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));
}

// ---------------------------------------------------------------------------
// Signal handling
// ---------------------------------------------------------------------------

/// Set up a shared shutdown flag that is set to `true` when SIGINT or
/// SIGTERM is received from an external source (e.g. `kill -2`, `kill -15`).
///
/// Returns an `Arc<AtomicBool>` that the event loop checks each tick.
/// The flag is set by a background thread that listens for OS signals
/// using `tokio::signal` via a one-shot tokio runtime.
///
/// Note: When crossterm raw mode is active, Ctrl+C is intercepted as a
/// key event and does NOT generate SIGINT. This handler catches external
/// signals (e.g. `kill -2 <pid>`) that bypass the TUI input handling.
pub fn setup_signal_handler() -> Arc<AtomicBool> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(_) => return, // Best-effort: if runtime fails, skip signal handling.
        };

        rt.block_on(async {
            tokio::select! {
                _ = async {
                    if let Ok(mut s) = tokio::signal::unix::signal(
                        tokio::signal::unix::SignalKind::interrupt(),
                    ) {
                        s.recv().await;
                    }
                } => {}
                _ = async {
                    if let Ok(mut s) = tokio::signal::unix::signal(
                        tokio::signal::unix::SignalKind::terminate(),
                    ) {
                        s.recv().await;
                    }
                } => {}
            }
            shutdown_clone.store(true, Ordering::SeqCst);
        });
    });

    shutdown
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run the TUI application against `spec`.
///
/// Takes over the terminal, starts the byte source, enters the event loop,
/// and restores the terminal on exit. Must be called from within a tokio
/// runtime (the file tailer is a tokio blocking task).
pub fn run_tui(config: AppConfig, spec: SourceSpec) -> io::Result<ExitReason> {
    install_panic_hook();

    // Set up signal handler before entering raw mode so that external
    // SIGINT/SIGTERM triggers a clean shutdown.
    let shutdown_flag = setup_signal_handler();

    info!(source = %spec, "starting viewer");
    let (mut source_rx, source_handle) = source::spawn_source(
        spec,
        config.source.poll_interval(),
        SOURCE_CHANNEL_CAPACITY,
    );

    let mut terminal = setup_terminal()?;
    let mut app = App::new(config);

    let result = run_event_loop(&mut terminal, &mut app, &shutdown_flag, &mut source_rx);

    source_handle.shutdown();

    // Always restore terminal, even if the event loop returned an error.
    restore_terminal(&mut terminal)?;

    result?;
    info!("viewer stopped");
    Ok(exit_reason(&mut app))
}

/// Report why the loop stopped, taking any source failure out of `app`.
fn exit_reason(app: &mut App) -> ExitReason {
    match app.source_error.take() {
        Some(e) => ExitReason::SourceFailed(e),
        None => ExitReason::Quit,
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// The core event loop: draw, poll, handle, repeat.
///
/// Checks the `shutdown_flag` each tick. When set by the signal handler,
/// the loop exits so the terminal is restored cleanly.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    shutdown_flag: &Arc<AtomicBool>,
    source_rx: &mut mpsc::Receiver<SourceEvent>,
) -> io::Result<()> {
    loop {
        // Check for external signal (SIGINT/SIGTERM) -- force quit.
        if shutdown_flag.load(Ordering::SeqCst) {
            app.should_quit = true;
            return Ok(());
        }

        // Draw only when state has changed.
        if app.needs_redraw {
            terminal.draw(|frame| ui::draw(frame, app))?;
            app.needs_redraw = false;
        }

        // Poll for crossterm events
        match poll_crossterm_event(TICK_RATE) {
            Some(AppEvent::Key(key)) => app.on_key(key),
            Some(AppEvent::Mouse(mouse)) => app.on_mouse(mouse),
            Some(AppEvent::Resize(w, h)) => app.on_resize(w, h),
            Some(AppEvent::Tick) | None => {}
        }

        // Drain source events (non-blocking).
        for evt in drain_source_events(source_rx, MAX_DRAIN_PER_TICK) {
            app.on_source_event(evt);
            if app.should_quit {
                break;
            }
        }

        // Check quit
        if app.should_quit {
            return Ok(());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_exit_reason_quit_without_source_error() {
        let mut app = App::new(AppConfig::default());
        app.on_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_quit);
        assert!(matches!(exit_reason(&mut app), ExitReason::Quit));
    }

    #[test]
    fn test_exit_reason_reports_source_failure() {
        let mut app = App::new(AppConfig::default());
        let err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        app.on_source_event(SourceEvent::Error(SourceError::Read(err)));
        assert!(app.should_quit);

        match exit_reason(&mut app) {
            ExitReason::SourceFailed(SourceError::Read(e)) => {
                assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("expected source failure, got {other:?}"),
        }
        // The error is taken, not copied.
        assert!(app.source_error.is_none());
    }
}
