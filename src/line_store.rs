//! Append-only store of complete log lines plus the trailing partial line.
//!
//! Bytes arrive in arbitrary chunks that need not line up with record
//! separators (or even with UTF-8 character boundaries). The store splits
//! them on `\n`, finalizes each terminated segment into an immutable line,
//! and keeps whatever follows the last separator in a pending buffer until
//! the rest of that line shows up.

use std::ops::Range;

// ---------------------------------------------------------------------------
// LineStore
// ---------------------------------------------------------------------------

/// Ordered, append-only sequence of lines and the still-open pending line.
///
/// Invariants:
/// - no stored line and no pending buffer ever contains `\n`;
/// - lines are never reordered or removed;
/// - ingesting a chunk in one call or split at any byte boundary across
///   several calls yields the same lines and pending buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<String>,
    pending: String,
    /// Trailing bytes of an incomplete UTF-8 sequence (at most 3).
    utf8_carry: Vec<u8>,
}

impl LineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw bytes.
    ///
    /// The first segment of the chunk extends the current pending buffer;
    /// every `\n` finalizes the pending buffer into a new line; the text
    /// after the last `\n` becomes the new pending buffer.
    ///
    /// Returns the index range of the lines finalized by this call, so the
    /// caller can classify exactly those lines.
    pub fn ingest(&mut self, chunk: &[u8]) -> Range<usize> {
        let start = self.lines.len();
        if chunk.is_empty() {
            return start..start;
        }

        let text = self.decode(chunk);
        let mut segments = text.split('\n');
        if let Some(first) = segments.next() {
            self.pending.push_str(first);
        }
        for segment in segments {
            let finished = std::mem::replace(&mut self.pending, segment.to_string());
            self.lines.push(finalize_line(finished));
        }

        start..self.lines.len()
    }

    /// Decode `chunk` as UTF-8, prefixed by any carried partial sequence.
    ///
    /// Invalid sequences become U+FFFD. An incomplete sequence at the very
    /// end is held back until the next chunk arrives.
    fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.utf8_carry);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        out.push_str(valid);
                    }
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            self.utf8_carry = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// All complete lines, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Text received since the last separator.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Number of complete lines (the pending buffer is not counted).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Every line followed by the pending buffer when it is non-empty.
    pub fn content(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.lines.iter().map(String::as_str).collect();
        if !self.pending.is_empty() {
            all.push(&self.pending);
        }
        all
    }
}

/// Strip the `\r` of a CRLF terminator.
fn finalize_line(mut line: String) -> String {
    if line.ends_with('\r') {
        line.pop();
    }
    line
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ingest_all(chunks: &[&[u8]]) -> LineStore {
        let mut store = LineStore::new();
        for chunk in chunks {
            store.ingest(chunk);
        }
        store
    }

    // -- Basic splitting ----------------------------------------------------

    #[test]
    fn test_trailing_segment_becomes_pending() {
        let store = ingest_all(&[b"a\nb\nc"]);
        assert_eq!(store.lines(), &["a".to_string(), "b".to_string()]);
        assert_eq!(store.pending(), "c");
    }

    #[test]
    fn test_terminated_chunk_leaves_pending_empty() {
        let store = ingest_all(&[b"one\ntwo\n"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.pending(), "");
    }

    #[test]
    fn test_pending_completed_by_next_chunk() {
        let mut store = LineStore::new();
        store.ingest(b"hel");
        assert!(store.is_empty());
        assert_eq!(store.pending(), "hel");

        let added = store.ingest(b"lo\nwor");
        assert_eq!(added, 0..1);
        assert_eq!(store.lines(), &["hello".to_string()]);
        assert_eq!(store.pending(), "wor");
    }

    #[test]
    fn test_lone_separator_flushes_pending() {
        let mut store = LineStore::new();
        store.ingest(b"partial");
        store.ingest(b"\n");
        assert_eq!(store.lines(), &["partial".to_string()]);
        assert_eq!(store.pending(), "");
    }

    #[test]
    fn test_empty_lines_are_kept() {
        let store = ingest_all(&[b"\n\nx\n"]);
        assert_eq!(
            store.lines(),
            &["".to_string(), "".to_string(), "x".to_string()]
        );
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut store = LineStore::new();
        store.ingest(b"abc");
        let added = store.ingest(b"");
        assert_eq!(added, 0..0);
        assert_eq!(store.pending(), "abc");
    }

    #[test]
    fn test_ingest_returns_range_of_new_lines() {
        let mut store = LineStore::new();
        assert_eq!(store.ingest(b"a\nb\n"), 0..2);
        assert_eq!(store.ingest(b"c\nd"), 2..3);
        assert_eq!(store.ingest(b"\n"), 3..4);
    }

    // -- CRLF and decoding --------------------------------------------------

    #[test]
    fn test_crlf_terminator_is_stripped() {
        let store = ingest_all(&[b"one\r\ntwo\r", b"\nthree"]);
        assert_eq!(store.lines(), &["one".to_string(), "two".to_string()]);
        assert_eq!(store.pending(), "three");
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let bytes = "é\n".as_bytes();
        let store = ingest_all(&[&bytes[..1], &bytes[1..]]);
        assert_eq!(store.lines(), &["é".to_string()]);
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let store = ingest_all(&[b"ok\xff\n"]);
        assert_eq!(store.lines(), &["ok\u{FFFD}".to_string()]);
    }

    #[test]
    fn test_content_includes_pending() {
        let store = ingest_all(&[b"a\nb"]);
        assert_eq!(store.content(), vec!["a", "b"]);

        let store = ingest_all(&[b"a\n"]);
        assert_eq!(store.content(), vec!["a"]);
    }

    // -- Chunking invariance ------------------------------------------------

    proptest! {
        #[test]
        fn prop_split_anywhere_matches_single_ingest(
            text in "[a-cé日\\n\\r]{0,40}",
            cut in 0usize..200,
        ) {
            let bytes = text.as_bytes();
            let cut = cut.min(bytes.len());

            let whole = ingest_all(&[bytes]);
            let split = ingest_all(&[&bytes[..cut], &bytes[cut..]]);

            prop_assert_eq!(whole.lines(), split.lines());
            prop_assert_eq!(whole.pending(), split.pending());
        }

        #[test]
        fn prop_byte_at_a_time_matches_single_ingest(text in "[xy\\n]{0,30}") {
            let bytes = text.as_bytes();
            let whole = ingest_all(&[bytes]);
            let mut drip = LineStore::new();
            for b in bytes {
                drip.ingest(std::slice::from_ref(b));
            }
            prop_assert_eq!(whole.lines(), drip.lines());
            prop_assert_eq!(whole.pending(), drip.pending());
        }
    }
}
