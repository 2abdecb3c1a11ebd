//! Byte producers feeding the viewer: a polling file tailer and a stdin
//! reader.
//!
//! Producers run off the event loop and only ever talk to it through a
//! bounded tokio channel. Each poll (file) or read (stdin) becomes one
//! [`SourceEvent::Chunk`]; chunk boundaries carry no meaning, the line
//! store reassembles lines on its side.
//!
//! Key features:
//! - Byte-offset tracking so each poll reads only what was appended
//! - Truncation detection (restart from the beginning when the file shrinks)
//! - Per-read cap so a huge append cannot allocate unbounded memory
//! - End of stdin is reported in-band as a final `EOF` line

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Maximum number of bytes read from a file in one poll (64 MiB). Anything
/// beyond this is picked up on the following polls.
const MAX_READ_BYTES: u64 = 64 * 1024 * 1024;

/// Size of a single stdin read.
const STDIN_BUF_SIZE: usize = 64 * 1024;

/// Appended to the log when stdin is exhausted.
pub const EOF_MARKER: &[u8] = b"EOF\n";

// ---------------------------------------------------------------------------
// SourceSpec
// ---------------------------------------------------------------------------

/// Where log bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Stdin,
    File(PathBuf),
}

impl SourceSpec {
    /// Interpret a positional CLI argument: absent or `-` means stdin.
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            None => SourceSpec::Stdin,
            Some(p) if p.as_os_str() == "-" => SourceSpec::Stdin,
            Some(p) => SourceSpec::File(p.to_path_buf()),
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Stdin => write!(f, "<stdin>"),
            SourceSpec::File(p) => write!(f, "{}", p.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceEvent / SourceError
// ---------------------------------------------------------------------------

/// Messages from a producer to the event loop.
#[derive(Debug)]
pub enum SourceEvent {
    /// Bytes read in one poll.
    Chunk(Vec<u8>),
    /// The producer failed and has stopped.
    Error(SourceError),
}

/// Failures of a byte producer. Always fatal to the viewer.
#[derive(Debug)]
pub enum SourceError {
    /// The file could not be opened.
    Open { path: PathBuf, source: io::Error },
    /// Reading failed after the source was opened.
    Read(io::Error),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Open { path, source } => {
                write!(f, "could not open {}: {}", path.display(), source)
            }
            SourceError::Read(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Open { source, .. } => Some(source),
            SourceError::Read(e) => Some(e),
        }
    }
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::Read(err)
    }
}

// ---------------------------------------------------------------------------
// SourceHandle
// ---------------------------------------------------------------------------

/// Handle for stopping a producer.
///
/// The file tailer checks the shutdown flag between polls. The stdin reader
/// runs on a detached thread (a blocking read cannot be interrupted) and
/// exits at its next read or when the receiver is dropped.
#[derive(Debug)]
pub struct SourceHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SourceHandle {
    /// Signal the producer to stop and abort its task.
    pub fn shutdown(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Incremental file reading
// ---------------------------------------------------------------------------

/// Read position within a tailed file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct FileTailState {
    pub(crate) offset: u64,
}

/// Read everything appended to `file` since the offset in `state`.
///
/// If the file is now shorter than the offset it was truncated, and
/// reading restarts from byte 0. At most [`MAX_READ_BYTES`] are returned.
pub(crate) fn read_new_bytes(file: &mut File, state: &mut FileTailState) -> io::Result<Vec<u8>> {
    let file_len = file.metadata()?.len();

    if file_len < state.offset {
        warn!(
            old_offset = state.offset,
            new_len = file_len,
            "file truncated, reading from start"
        );
        state.offset = 0;
    }

    if file_len == state.offset {
        return Ok(Vec::new());
    }

    file.seek(SeekFrom::Start(state.offset))?;
    let read_limit = (file_len - state.offset).min(MAX_READ_BYTES);
    let mut buf = Vec::with_capacity(read_limit as usize);
    let bytes_read = file.by_ref().take(read_limit).read_to_end(&mut buf)?;
    state.offset += bytes_read as u64;
    Ok(buf)
}

/// Forward everything from `reader` until end of input, then send
/// [`EOF_MARKER`] on a line of its own.
///
/// An unterminated last line is closed with `\n` first. Stops early when
/// the receiver is gone or `shutdown` is set.
fn pump_reader<R: Read>(mut reader: R, tx: &mpsc::Sender<SourceEvent>, shutdown: &AtomicBool) {
    let mut buf = vec![0u8; STDIN_BUF_SIZE];
    let mut at_line_start = true;
    while !shutdown.load(Ordering::SeqCst) {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!("end of input");
                let mut tail = Vec::with_capacity(EOF_MARKER.len() + 1);
                if !at_line_start {
                    tail.push(b'\n');
                }
                tail.extend_from_slice(EOF_MARKER);
                let _ = tx.blocking_send(SourceEvent::Chunk(tail));
                return;
            }
            Ok(n) => {
                at_line_start = buf[n - 1] == b'\n';
                if tx.blocking_send(SourceEvent::Chunk(buf[..n].to_vec())).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = tx.blocking_send(SourceEvent::Error(e.into()));
                return;
            }
        }
    }
}

/// Poll `path` every `poll_interval` until shutdown or failure.
fn tail_file(
    path: PathBuf,
    poll_interval: Duration,
    tx: mpsc::Sender<SourceEvent>,
    shutdown: Arc<AtomicBool>,
) {
    let mut file = match File::open(&path) {
        Ok(f) => f,
        Err(source) => {
            let _ = tx.blocking_send(SourceEvent::Error(SourceError::Open { path, source }));
            return;
        }
    };
    info!(path = %path.display(), "tailing file");

    let mut state = FileTailState::default();
    while !shutdown.load(Ordering::SeqCst) {
        match read_new_bytes(&mut file, &mut state) {
            Ok(bytes) if bytes.is_empty() => {}
            Ok(bytes) => {
                debug!(bytes = bytes.len(), offset = state.offset, "read chunk");
                if tx.blocking_send(SourceEvent::Chunk(bytes)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = tx.blocking_send(SourceEvent::Error(e.into()));
                break;
            }
        }
        std::thread::sleep(poll_interval);
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Start producing bytes from `spec`.
///
/// Returns the receiving end of a channel with room for `channel_capacity`
/// events, and a handle to stop the producer. Open and read failures are
/// delivered on the channel as [`SourceEvent::Error`].
pub fn spawn_source(
    spec: SourceSpec,
    poll_interval: Duration,
    channel_capacity: usize,
) -> (mpsc::Receiver<SourceEvent>, SourceHandle) {
    let (tx, rx) = mpsc::channel::<SourceEvent>(channel_capacity);
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    let handle = match spec {
        SourceSpec::File(path) => Some(tokio::task::spawn_blocking(move || {
            tail_file(path, poll_interval, tx, shutdown_clone)
        })),
        SourceSpec::Stdin => {
            std::thread::spawn(move || pump_reader(io::stdin().lock(), &tx, &shutdown_clone));
            None
        }
    };

    (rx, SourceHandle { shutdown, handle })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_store::LineStore;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;

    const POLL: Duration = Duration::from_millis(5);

    fn create_temp_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn append(path: &Path, content: &[u8]) {
        let mut f = std::fs::OpenOptions::new().append(true).open(path).unwrap();
        f.write_all(content).unwrap();
        f.flush().unwrap();
    }

    async fn next_event(rx: &mut mpsc::Receiver<SourceEvent>) -> SourceEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for source event")
            .expect("source channel closed")
    }

    // -- SourceSpec ----------------------------------------------------------

    #[test]
    fn test_from_arg() {
        assert_eq!(SourceSpec::from_arg(None), SourceSpec::Stdin);
        assert_eq!(SourceSpec::from_arg(Some(Path::new("-"))), SourceSpec::Stdin);
        assert_eq!(
            SourceSpec::from_arg(Some(Path::new("app.log"))),
            SourceSpec::File(PathBuf::from("app.log"))
        );
    }

    #[test]
    fn test_spec_display() {
        assert_eq!(SourceSpec::Stdin.to_string(), "<stdin>");
        assert_eq!(SourceSpec::File("/var/log/x".into()).to_string(), "/var/log/x");
    }

    // -- read_new_bytes ------------------------------------------------------

    #[test]
    fn test_read_new_bytes_incremental() {
        let tmp = TempDir::new().unwrap();
        let path = create_temp_file(tmp.path(), "a.log", b"one\ntw");
        let mut file = File::open(&path).unwrap();
        let mut state = FileTailState::default();

        assert_eq!(read_new_bytes(&mut file, &mut state).unwrap(), b"one\ntw");
        assert_eq!(state.offset, 6);
        assert!(read_new_bytes(&mut file, &mut state).unwrap().is_empty());

        append(&path, b"o\n");
        assert_eq!(read_new_bytes(&mut file, &mut state).unwrap(), b"o\n");
        assert_eq!(state.offset, 8);
    }

    #[test]
    fn test_read_new_bytes_detects_truncation() {
        let tmp = TempDir::new().unwrap();
        let path = create_temp_file(tmp.path(), "a.log", b"a long first line\n");
        let mut file = File::open(&path).unwrap();
        let mut state = FileTailState::default();
        read_new_bytes(&mut file, &mut state).unwrap();

        std::fs::write(&path, b"new\n").unwrap();
        assert_eq!(read_new_bytes(&mut file, &mut state).unwrap(), b"new\n");
        assert_eq!(state.offset, 4);
    }

    // -- pump_reader ---------------------------------------------------------

    fn pumped(input: &[u8]) -> Vec<u8> {
        let (tx, mut rx) = mpsc::channel(16);
        let shutdown = AtomicBool::new(false);
        pump_reader(Cursor::new(input.to_vec()), &tx, &shutdown);

        let mut bytes = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                SourceEvent::Chunk(chunk) => bytes.extend(chunk),
                SourceEvent::Error(e) => panic!("unexpected error: {e}"),
            }
        }
        bytes
    }

    #[test]
    fn test_pump_reader_closes_last_line_before_eof() {
        let bytes = pumped(b"x\ny");
        assert_eq!(bytes, b"x\ny\nEOF\n");

        let mut store = LineStore::new();
        store.ingest(&bytes);
        assert_eq!(store.lines(), &["x".to_string(), "y".to_string(), "EOF".to_string()]);
        assert_eq!(store.pending(), "");
    }

    #[test]
    fn test_pump_reader_terminated_input_gets_bare_marker() {
        assert_eq!(pumped(b"first\nlast\n"), b"first\nlast\nEOF\n");
    }

    #[test]
    fn test_pump_reader_empty_input_sends_only_marker() {
        assert_eq!(pumped(b""), EOF_MARKER);
    }

    #[test]
    fn test_pump_reader_honours_shutdown() {
        let (tx, mut rx) = mpsc::channel(16);
        let shutdown = AtomicBool::new(true);
        pump_reader(Cursor::new(b"ignored".to_vec()), &tx, &shutdown);
        assert!(rx.try_recv().is_err());
    }

    // -- SourceError ---------------------------------------------------------

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Open {
            path: PathBuf::from("/nope"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "could not open /nope: missing");

        let err: SourceError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert_eq!(err.to_string(), "read failed: boom");
        assert!(std::error::Error::source(&err).is_some());
    }

    // -- spawn_source --------------------------------------------------------

    #[tokio::test]
    async fn test_spawn_source_tails_appends() {
        let tmp = TempDir::new().unwrap();
        let path = create_temp_file(tmp.path(), "live.log", b"first\n");
        let (mut rx, handle) = spawn_source(SourceSpec::File(path.clone()), POLL, 16);

        match next_event(&mut rx).await {
            SourceEvent::Chunk(bytes) => assert_eq!(bytes, b"first\n"),
            other => panic!("expected chunk, got {other:?}"),
        }

        append(&path, b"second\n");
        match next_event(&mut rx).await {
            SourceEvent::Chunk(bytes) => assert_eq!(bytes, b"second\n"),
            other => panic!("expected chunk, got {other:?}"),
        }

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_spawn_source_missing_file_reports_open_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("does-not-exist.log");
        let (mut rx, handle) = spawn_source(SourceSpec::File(path.clone()), POLL, 4);

        match next_event(&mut rx).await {
            SourceEvent::Error(SourceError::Open { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected open error, got {other:?}"),
        }
        handle.shutdown();
    }
}
