mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::WARN.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let data = commands::run(&cli)?;
    output::render(&data, cli.pretty)
}
