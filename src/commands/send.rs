//! Send Command
//!
//! Sends a chat message and streams the reply to the terminal. Ctrl-C
//! cancels the stream; whatever arrived before the cancel is kept in the
//! transcript.

use crate::cli::SendArgs;
use crate::commands::{cancel_on_ctrl_c, finish_stream_output, spawn_stream_printer, AppContext};
use crate::utils::error::AppResult;

use reportdeck_core::is_strict_report_trigger;

pub async fn run(args: &SendArgs, ctx: AppContext) -> AppResult<()> {
    let mut chat = ctx.into_chat()?;
    let strict = is_strict_report_trigger(&args.message);
    if strict {
        println!("Generating structured report...");
    }

    let (events, printer) = spawn_stream_printer();
    let cancel = cancel_on_ctrl_c();
    let report = chat
        .send_message(&args.message, args.mode.as_deref(), events, cancel)
        .await?;
    let _ = printer.await;

    finish_stream_output(&report, strict);
    Ok(())
}
