use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod cmd;
mod error;
mod format;
mod io;

pub use cli::{OutputFormat, PathOrStdin};

use cli::{Cli, Command};
use error::CliError;
use format::FormatterConfig;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "RUNSCAN_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let code = match dispatch(&cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e.message());
            e.exit_code()
        }
    };
    std::process::exit(code);
}

/// Installs the stderr log subscriber.
///
/// `RUNSCAN_LOG` wins when set; otherwise the level follows `--quiet` and
/// `--verbose`.
fn init_tracing(cli: &Cli) {
    let default = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(cli: &Cli) -> Result<(), CliError> {
    let config = FormatterConfig::from_flags(cli.no_color, cli.quiet, cli.verbose);

    match &cli.command {
        Command::Extract { file, all, extract } => {
            let extractor = cmd::build_extractor(extract, cli.max_file_size)?;
            let content = io::read_input(file, cli.max_file_size)?;
            tracing::debug!(source = %io::source_label(file), "read OCR text");
            cmd::extract::run(&content, &extractor, *all, cli.format, &config)
        }
        Command::Validate { runs } => cmd::validate::run(runs, cli.format, &config),
        Command::CheckDigit { body } => cmd::check_digit::run(body, cli.format),
        Command::Screen {
            capture,
            registry,
            extract,
            decision,
        } => {
            let extractor = cmd::build_extractor(extract, cli.max_file_size)?;
            let mut clients = cmd::load_registry(registry, cli.max_file_size)?;
            let content = io::read_input(capture, cli.max_file_size)?;
            cmd::screen::run(
                &content,
                &io::source_label(capture),
                &mut clients,
                registry,
                &extractor,
                decision,
                Utc::now(),
                cli.format,
                &config,
            )
        }
        Command::Unban { run, registry } => {
            let mut clients = cmd::load_registry(registry, cli.max_file_size)?;
            cmd::unban::run(run, &mut clients, registry, cli.format)
        }
        Command::Visits { run, registry } => {
            let clients = cmd::load_registry(registry, cli.max_file_size)?;
            cmd::visits::run(run, &clients, cli.format)
        }
        Command::Stats { registry, date } => {
            let clients = cmd::load_registry(registry, cli.max_file_size)?;
            let day = date.unwrap_or_else(|| Utc::now().date_naive());
            cmd::stats::run(day, &clients, cli.format)
        }
    }
}
