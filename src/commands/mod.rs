//! CLI Commands
//!
//! One module per subcommand plus the shared application context. The
//! dispatcher builds the context (config, store, transport choice) and
//! routes to the handler.

mod config;
mod export;
mod report;
mod runs;
mod send;
mod show;

use std::io::Write as _;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use reportdeck_agent::{
    AgentTransport, HttpTransport, ReplayTransport, StreamEnd, StreamEvent,
};

use crate::cli::{Cli, Command};
use crate::models::settings::AppConfig;
use crate::services::chat::{ChatService, SendReport};
use crate::storage::config::ConfigService;
use crate::storage::store::RunStore;
use crate::utils::error::{AppError, AppResult};

/// Shared state every handler starts from.
pub(crate) struct AppContext {
    pub config: AppConfig,
    pub store: RunStore,
    replay: bool,
}

impl AppContext {
    fn init(cli: &Cli) -> AppResult<Self> {
        let service = ConfigService::new()?;
        let mut config = service.get_config().clone();
        if let Some(endpoint) = &cli.endpoint {
            config.endpoint = endpoint.clone();
            config.validate().map_err(AppError::validation)?;
        }
        let store = RunStore::new(service.data_dir()?)?;

        Ok(Self {
            config,
            store,
            replay: cli.replay,
        })
    }

    fn transport(&self) -> Box<dyn AgentTransport> {
        if self.replay {
            debug!("using replay transport");
            Box::new(ReplayTransport::new())
        } else {
            debug!(endpoint = %self.config.endpoint, "using http transport");
            Box::new(HttpTransport::with_run_id_header(
                self.config.endpoint.clone(),
                self.config.run_id_header.clone(),
            ))
        }
    }

    /// Consume the context into a chat service resuming the persisted
    /// session.
    pub fn into_chat(self) -> AppResult<ChatService<Box<dyn AgentTransport>>> {
        let transport = self.transport();
        let mode = self.config.default_mode.clone();
        ChatService::resume(self.store, transport, mode)
    }

    /// The current run id and its stored raw report.
    pub fn current_report(&self) -> AppResult<(String, serde_json::Value)> {
        let snapshot = self.store.load_session()?;
        let run_id = snapshot
            .current_run
            .and_then(|run| run.run_id)
            .ok_or_else(|| {
                AppError::not_found("No active run. Send a message or load a run first.")
            })?;
        let report = self.store.load_report(&run_id)?.ok_or_else(|| {
            AppError::not_found(format!(
                "No stored report for run {}. Generate one with the report command.",
                run_id
            ))
        })?;
        Ok((run_id, report))
    }
}

/// Dispatch the parsed CLI to its handler.
pub async fn run(cli: Cli) -> AppResult<()> {
    let ctx = AppContext::init(&cli)?;
    match cli.command {
        Command::Send(args) => send::run(&args, ctx).await,
        Command::Report(args) => report::run(&args, ctx).await,
        Command::Retry => report::retry(ctx).await,
        Command::Show(args) => show::run(&args, &ctx),
        Command::Export(args) => export::run(&args, &ctx),
        Command::Runs => runs::list(&ctx),
        Command::Load(args) => runs::load(&args, &ctx),
        Command::New => runs::new_session(&ctx),
        Command::Config(args) => config::run(&args),
    }
}

/// Print stream events as they arrive. The task ends when the sender side
/// of the channel is dropped.
pub(crate) fn spawn_stream_printer() -> (mpsc::Sender<StreamEvent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<StreamEvent>(256);
    let handle = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::TextDelta { content } => {
                    let _ = write!(stdout, "{}", content);
                    let _ = stdout.flush();
                }
                StreamEvent::ReportParsed => {
                    eprintln!();
                    eprintln!("structured payload captured, finishing stream");
                }
            }
        }
    });
    (tx, handle)
}

/// A token that cancels on Ctrl-C, ending the stream early.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    cancel
}

/// Close out a streamed turn: end the delta line and surface the final
/// state that was not part of the stream itself.
pub(crate) fn finish_stream_output(report: &SendReport, strict: bool) {
    println!();
    match &report.end {
        StreamEnd::Completed => {
            if strict {
                println!("{}", report.assistant.content);
            }
        }
        StreamEnd::Canceled => {
            println!("_Stream canceled by user._");
        }
        StreamEnd::Failed { message } => {
            eprintln!("stream failed: {}", message);
        }
    }
    if let Some(notice) = &report.notice {
        eprintln!("{}", notice);
    }
}
