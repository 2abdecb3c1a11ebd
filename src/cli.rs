use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Tail, scroll and search a live log stream in the terminal
#[derive(Parser, Debug)]
#[command(
    name = "logtail",
    version,
    about = "Tail, scroll and search a live log stream in the terminal"
)]
pub struct Cli {
    /// Log file to follow. Omit or pass `-` to read standard input.
    pub file: Option<PathBuf>,

    /// Truncate long lines at the right edge instead of wrapping them.
    #[arg(long, conflicts_with = "soft_wrap")]
    pub hard_wrap: bool,

    /// Wrap long lines onto multiple rows (default).
    #[arg(long)]
    pub soft_wrap: bool,

    /// Start at the first line instead of following the end.
    #[arg(long)]
    pub head: bool,

    /// Hide the status line.
    #[arg(long)]
    pub no_status_bar: bool,

    /// Match search queries case-insensitively.
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Color theme: dark or light
    #[arg(long, value_enum)]
    pub theme: Option<Theme>,

    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write diagnostic logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level (only takes effect with a log file).
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum Theme {
    Dark,
    Light,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}
