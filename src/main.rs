use std::process::ExitCode;

use clap::Parser;
use kconfig::{KConfigError, ScanArgs, Scanner, Settings};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Discover, merge and query machine configuration.
#[derive(Parser)]
#[command(name = "kconfig")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    scan: ScanArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.scan.quiet { Level::ERROR } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match run(cli.scan) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: ScanArgs) -> Result<(), KConfigError> {
    let settings = Settings::load(args.settings.as_deref())?;
    let options = args.apply(settings.scan_options());
    let action = args.into_action();
    Scanner::from_options(options).handle_and_print(&action)
}
