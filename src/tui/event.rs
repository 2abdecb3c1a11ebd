//! Event handling for the TUI event loop.
//!
//! Wraps crossterm key/mouse/resize events into a single [`AppEvent`] enum
//! that the main loop can `match` on, and drains byte-source events without
//! blocking.

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::source::SourceEvent;

// ---------------------------------------------------------------------------
// AppEvent
// ---------------------------------------------------------------------------

/// Terminal events consumed by the TUI event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed.
    Key(KeyEvent),
    /// Mouse activity (only the wheel is acted on).
    Mouse(MouseEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// Nothing arrived before the tick elapsed.
    Tick,
}

// ---------------------------------------------------------------------------
// Event polling
// ---------------------------------------------------------------------------

/// Poll for the next crossterm event with the given timeout.
///
/// Returns [`AppEvent::Tick`] on timeout and `None` for events the viewer
/// ignores (key releases, focus changes, paste). This is a blocking call
/// intended to be run from the main thread.
pub fn poll_crossterm_event(timeout: Duration) -> Option<AppEvent> {
    if !event::poll(timeout).ok()? {
        return Some(AppEvent::Tick);
    }
    match event::read().ok()? {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        CrosstermEvent::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        CrosstermEvent::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

/// Drain pending source events, up to `max_per_tick`.
///
/// Stops as soon as `try_recv()` returns `Err` (empty or disconnected),
/// so this never blocks.
pub fn drain_source_events(
    rx: &mut mpsc::Receiver<SourceEvent>,
    max_per_tick: usize,
) -> Vec<SourceEvent> {
    let mut events = Vec::new();

    for _ in 0..max_per_tick {
        match rx.try_recv() {
            Ok(evt) => events.push(evt),
            Err(_) => break,
        }
    }

    events
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use std::io;

    // -- drain_source_events tests -------------------------------------------

    #[tokio::test]
    async fn test_drain_empty_channel() {
        let (_tx, mut rx) = mpsc::channel::<SourceEvent>(16);
        let events = drain_source_events(&mut rx, 100);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_drain_preserves_order() {
        let (tx, mut rx) = mpsc::channel::<SourceEvent>(16);
        tx.send(SourceEvent::Chunk(b"a\n".to_vec())).await.unwrap();
        tx.send(SourceEvent::Chunk(b"b\n".to_vec())).await.unwrap();

        let events = drain_source_events(&mut rx, 100);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], SourceEvent::Chunk(b) if b == b"a\n"));
        assert!(matches!(&events[1], SourceEvent::Chunk(b) if b == b"b\n"));
    }

    #[tokio::test]
    async fn test_drain_respects_max_per_tick() {
        let (tx, mut rx) = mpsc::channel::<SourceEvent>(16);
        for i in 0..5u8 {
            tx.send(SourceEvent::Chunk(vec![i])).await.unwrap();
        }

        // Only drain 3
        let events = drain_source_events(&mut rx, 3);
        assert_eq!(events.len(), 3);

        // Remaining 2 should still be in the channel
        let remaining = drain_source_events(&mut rx, 100);
        assert_eq!(remaining.len(), 2);
    }

    #[tokio::test]
    async fn test_drain_passes_errors_through() {
        let (tx, mut rx) = mpsc::channel::<SourceEvent>(16);
        tx.send(SourceEvent::Error(SourceError::Read(io::Error::new(
            io::ErrorKind::Other,
            "boom",
        ))))
        .await
        .unwrap();

        let events = drain_source_events(&mut rx, 100);
        assert!(matches!(&events[0], SourceEvent::Error(_)));
    }

    #[tokio::test]
    async fn test_drain_disconnected_channel() {
        let (tx, mut rx) = mpsc::channel::<SourceEvent>(16);
        tx.send(SourceEvent::Chunk(b"last".to_vec())).await.unwrap();
        drop(tx);

        assert_eq!(drain_source_events(&mut rx, 100).len(), 1);
        assert!(drain_source_events(&mut rx, 100).is_empty());
    }
}
