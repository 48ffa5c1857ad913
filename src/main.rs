//! Reportdeck binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use reportdeck::cli::Cli;
use reportdeck::commands;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("reportdeck error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    commands::run(cli).await?;
    Ok(())
}

/// Logging goes to stderr so streamed replies on stdout stay clean.
/// `REPORTDECK_LOG` overrides the verbosity flags.
fn init_tracing(quiet: bool, verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        _ if quiet => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env("REPORTDECK_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing: {error}"))?;

    Ok(())
}
