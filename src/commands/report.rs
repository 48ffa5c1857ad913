//! Report Command
//!
//! Requests a full structured report in strict JSON mode, and retries
//! the last strict request on demand. The streamed reply is shown as it
//! arrives while every chunk is folded into the JSON recovery buffer.

use crate::cli::ReportArgs;
use crate::commands::{cancel_on_ctrl_c, finish_stream_output, spawn_stream_printer, AppContext};
use crate::utils::error::AppResult;

pub async fn run(args: &ReportArgs, ctx: AppContext) -> AppResult<()> {
    let mut chat = ctx.into_chat()?;
    println!("Generating structured report...");

    let (events, printer) = spawn_stream_printer();
    let cancel = cancel_on_ctrl_c();
    let report = chat
        .request_report(args.mode.as_deref(), events, cancel)
        .await?;
    let _ = printer.await;

    finish_stream_output(&report, true);
    Ok(())
}

pub async fn retry(ctx: AppContext) -> AppResult<()> {
    let mut chat = ctx.into_chat()?;
    println!("Retrying structured report request...");

    let (events, printer) = spawn_stream_printer();
    let cancel = cancel_on_ctrl_c();
    let report = chat.retry_report(events, cancel).await?;
    let _ = printer.await;

    finish_stream_output(&report, true);
    Ok(())
}
