//! Interactive viewer for live log streams.
//!
//! The core is [`viewer::LogView`]: it ingests raw bytes, keeps a searchable
//! in-memory log, and renders a bounded viewport that either follows the
//! end of the stream or stays pinned to a line. The `tui` module hosts it
//! in a terminal; `source` feeds it from a file or stdin.

pub mod cli;
pub mod config;
pub mod line_store;
pub mod logging;
pub mod render;
pub mod scroll;
pub mod search;
pub mod source;
pub mod theme;
pub mod tui;
pub mod viewer;
pub mod wrap;
