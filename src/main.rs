use clap::Parser;
use logtail::cli::Cli;
use logtail::config::build_config;
use logtail::logging;
use logtail::source::SourceSpec;
use logtail::tui::{self, ExitReason};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let app_config = build_config(&cli);

    if let Err(e) = logging::init(app_config.log_file.as_deref(), app_config.verbose) {
        eprintln!("logtail: warning: could not open log file: {}", e);
    }
    tracing::debug!(config = ?app_config, "effective config");

    let spec = SourceSpec::from_arg(app_config.file.as_deref());
    match tui::run_tui(app_config, spec) {
        Ok(ExitReason::Quit) => {}
        Ok(ExitReason::SourceFailed(e)) => {
            eprintln!("logtail: source error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("logtail: TUI error: {}", e);
            std::process::exit(1);
        }
    }
}
