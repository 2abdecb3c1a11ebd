//! Diagnostic logging setup.
//!
//! The TUI owns the terminal, so diagnostics can only go to a file. When no
//! log file is configured no subscriber is installed and every `tracing`
//! macro is a no-op.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g.
/// `LOGTAIL_LOG=logtail::source=trace`.
pub const LOG_ENV_VAR: &str = "LOGTAIL_LOG";

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Build the filter: `LOGTAIL_LOG` if set and valid, otherwise the default
/// for `verbose`.
pub fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install a global subscriber appending plain-text events to `log_file`.
///
/// Returns `Ok(false)` when no file is configured or a subscriber was
/// already installed.
pub fn init(log_file: Option<&Path>, verbose: bool) -> io::Result<bool> {
    let Some(path) = log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();
    Ok(installed)
}
