//! CLI argument definitions for Reportdeck.
//!
//! This module contains the command-line interface structure using Clap.
//! The CLI drives a streaming chat against a report agent endpoint and
//! manages the structured reports those runs produce.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `send` | Send a chat message and stream the reply |
//! | `report` | Request a full structured report (strict JSON mode) |
//! | `retry` | Re-send the last strict report request |
//! | `show` | Display the current run's report |
//! | `export` | Write the current run's report to a JSON file |
//! | `runs` | List known runs, most recent first |
//! | `load` | Switch the session to a previous run |
//! | `new` | Start a fresh session, keeping run history |
//! | `config` | Inspect or update configuration |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Reportdeck - streaming business report client
///
/// Chats with a report agent over a streaming HTTP endpoint. Sending the
/// trigger phrase (or running `report`) asks the agent for a structured
/// JSON report, which is recovered from the stream, stored per run, and
/// rendered with `show`.
#[derive(Debug, Parser)]
#[command(
    name = "reportdeck",
    version,
    about = "Streaming business report client"
)]
pub struct Cli {
    /// Agent endpoint URL, overriding the configured one.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Stream canned demo fixtures instead of calling the endpoint.
    #[arg(long, global = true, default_value_t = false)]
    pub replay: bool,

    /// Increase log verbosity (repeat for more detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log errors only.
    #[arg(short, long, global = true, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a chat message and stream the reply.
    ///
    /// The message is decorated with the analysis mode label before it
    /// is sent. Typing the report trigger phrase switches the turn to
    /// strict JSON mode automatically.
    Send(SendArgs),

    /// Request a full structured report in strict JSON mode.
    ///
    /// Sends the trigger phrase, folds the streamed reply into a JSON
    /// recovery buffer, and stores the parsed report for the run.
    Report(ReportArgs),

    /// Re-send the last strict report request.
    Retry,

    /// Display the current run's report.
    Show(ShowArgs),

    /// Write the current run's report to a JSON file.
    Export(ExportArgs),

    /// List known runs, most recent first.
    Runs,

    /// Switch the session to a previously started run.
    Load(LoadArgs),

    /// Start a fresh session. Run history and stored reports are kept.
    New,

    /// Inspect or update configuration.
    Config(ConfigArgs),
}

/// Arguments for the `send` command.
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Message text to send.
    pub message: String,

    /// Analysis mode label (defaults to the configured mode).
    #[arg(long)]
    pub mode: Option<String>,
}

/// Arguments for the `report` command.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Analysis mode label recorded with the request.
    #[arg(long)]
    pub mode: Option<String>,
}

/// Arguments for the `show` command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// What-if revenue for the latest quarter; the revenue series is
    /// rescaled proportionally.
    #[arg(long, value_name = "AMOUNT")]
    pub override_revenue: Option<f64>,

    /// Include the quarter-over-quarter revenue growth table.
    #[arg(long, default_value_t = false)]
    pub growth: bool,
}

/// Arguments for the `export` command.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output path (defaults to business-report-<run>.json).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// What-if revenue override applied before exporting.
    #[arg(long, value_name = "AMOUNT")]
    pub override_revenue: Option<f64>,
}

/// Arguments for the `load` command.
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Run id to switch to, as listed by `runs`.
    pub run_id: String,
}

/// Arguments for the `config` command group.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the active configuration.
    Show,

    /// Set the agent endpoint URL.
    SetEndpoint(SetEndpointArgs),

    /// Set the default analysis mode label.
    SetMode(SetModeArgs),
}

/// Arguments for `config set-endpoint`.
#[derive(Debug, Args)]
pub struct SetEndpointArgs {
    /// Endpoint URL, e.g. https://agents.example.com/report
    pub endpoint: String,
}

/// Arguments for `config set-mode`.
#[derive(Debug, Args)]
pub struct SetModeArgs {
    /// Mode label, e.g. Quick or Deep
    pub mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_send_parses_message_and_mode() {
        let cli = Cli::try_parse_from(["reportdeck", "send", "hello there", "--mode", "Deep"])
            .unwrap();
        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.message, "hello there");
                assert_eq!(args.mode.as_deref(), Some("Deep"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["reportdeck", "report", "--replay"]).unwrap();
        assert!(cli.replay);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["reportdeck", "-q", "-v", "runs"]).is_err());
    }

    #[test]
    fn test_show_accepts_override() {
        let cli = Cli::try_parse_from([
            "reportdeck",
            "show",
            "--override-revenue",
            "120.5",
            "--growth",
        ])
        .unwrap();
        match cli.command {
            Command::Show(args) => {
                assert_eq!(args.override_revenue, Some(120.5));
                assert!(args.growth);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
