use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{Cli, Theme};
use crate::render::Styles;
use crate::theme::ThemeColors;
use crate::viewer::ViewerOptions;
use crate::wrap::WrapMode;

/// Default interval between polls of a tailed file.
const DEFAULT_POLL_INTERVAL_MS: u64 = 32;

// ---------------------------------------------------------------------------
// TOML-deserializable config (intermediate representation)
// ---------------------------------------------------------------------------

/// Raw config as parsed from the TOML file.
/// All fields are optional so that missing keys fall through to defaults.
/// Unknown keys are silently ignored by serde.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    verbose: Option<bool>,
    theme: Option<String>,
    log_file: Option<PathBuf>,
    display: FileDisplayConfig,
    search: FileSearchConfig,
    source: FileSourceConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileDisplayConfig {
    status_bar: Option<bool>,
    wrap: Option<String>,
    start_at_head: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileSearchConfig {
    case_insensitive: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileSourceConfig {
    poll_interval_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Effective (merged) config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// File to tail; `None` reads stdin.
    pub file: Option<PathBuf>,
    pub verbose: bool,
    pub theme: Theme,
    pub log_file: Option<PathBuf>,
    pub display: DisplayConfig,
    pub search: SearchConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub status_bar: bool,
    pub wrap: WrapMode,
    pub start_at_head: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchConfig {
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub poll_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            file: None,
            verbose: false,
            theme: Theme::Dark,
            log_file: None,
            display: DisplayConfig::default(),
            search: SearchConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            status_bar: true,
            wrap: WrapMode::Soft,
            start_at_head: false,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl SourceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl AppConfig {
    /// Viewer settings derived from this config.
    pub fn viewer_options(&self) -> ViewerOptions {
        ViewerOptions {
            show_status_bar: self.display.status_bar,
            start_at_head: self.display.start_at_head,
            wrap_mode: self.display.wrap,
            case_insensitive: self.search.case_insensitive,
            styles: Styles::from_theme(&ThemeColors::from_theme(&self.theme)),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Returns the default config file path: `~/.config/logtail/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("logtail").join("config.toml"))
}

/// Load the config file from the given path.
/// Returns the parsed `FileConfig`, or `None` if the file does not exist
/// or cannot be parsed.
fn load_file_config(path: &Path) -> Option<FileConfig> {
    if !path.exists() {
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<FileConfig>(&contents) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!(
                    "logtail: warning: failed to parse config file {}: {}",
                    path.display(),
                    e
                );
                None
            }
        },
        Err(e) => {
            eprintln!(
                "logtail: warning: failed to read config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// Parse a theme string from the config file into a `Theme` enum.
/// Returns `None` if the string is not recognized (caller uses default).
fn parse_theme(s: &str) -> Option<Theme> {
    match s.to_lowercase().as_str() {
        "dark" => Some(Theme::Dark),
        "light" => Some(Theme::Light),
        other => {
            eprintln!(
                "logtail: warning: unknown theme \"{}\", using default",
                other
            );
            None
        }
    }
}

/// Parse the `display.wrap` value.
fn parse_wrap_mode(s: &str) -> Option<WrapMode> {
    match s.to_lowercase().as_str() {
        "soft" => Some(WrapMode::Soft),
        "hard" => Some(WrapMode::Hard),
        other => {
            eprintln!(
                "logtail: warning: unknown wrap mode \"{}\", using default",
                other
            );
            None
        }
    }
}

/// Copy every value present in the file over the defaults.
fn overlay_file_config(config: &mut AppConfig, file_cfg: FileConfig) {
    if let Some(v) = file_cfg.verbose {
        config.verbose = v;
    }
    if let Some(ref t) = file_cfg.theme {
        if let Some(theme) = parse_theme(t) {
            config.theme = theme;
        }
    }
    if file_cfg.log_file.is_some() {
        config.log_file = file_cfg.log_file;
    }
    if let Some(v) = file_cfg.display.status_bar {
        config.display.status_bar = v;
    }
    if let Some(ref w) = file_cfg.display.wrap {
        if let Some(mode) = parse_wrap_mode(w) {
            config.display.wrap = mode;
        }
    }
    if let Some(v) = file_cfg.display.start_at_head {
        config.display.start_at_head = v;
    }
    if let Some(v) = file_cfg.search.case_insensitive {
        config.search.case_insensitive = v;
    }
    match file_cfg.source.poll_interval_ms {
        Some(0) => {
            eprintln!("logtail: warning: poll_interval_ms must be positive, using default");
        }
        Some(ms) => config.source.poll_interval_ms = ms,
        None => {}
    }
}

/// Build the effective `AppConfig` by merging defaults, config file, and CLI args.
///
/// Precedence (highest wins):
/// 1. CLI flags (if explicitly provided)
/// 2. Config file values
/// 3. Hardcoded defaults
pub fn build_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::default();

    let config_path = cli.config.clone().or_else(default_config_path);

    if let Some(ref path) = config_path {
        if let Some(file_cfg) = load_file_config(path) {
            overlay_file_config(&mut config, file_cfg);
        } else if cli.config.is_some() && !path.exists() {
            // An explicit --config that is missing deserves a warning; a
            // missing default file does not.
            eprintln!(
                "logtail: warning: config file not found: {}",
                path.display()
            );
        }
    }

    // CLI overrides
    config.file = cli.file.clone();
    if cli.verbose {
        config.verbose = true;
    }
    if let Some(ref theme) = cli.theme {
        config.theme = theme.clone();
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    if cli.hard_wrap {
        config.display.wrap = WrapMode::Hard;
    }
    if cli.soft_wrap {
        config.display.wrap = WrapMode::Soft;
    }
    if cli.head {
        config.display.start_at_head = true;
    }
    if cli.no_status_bar {
        config.display.status_bar = false;
    }
    if cli.ignore_case {
        config.search.case_insensitive = true;
    }

    config
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
