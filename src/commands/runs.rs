//! Run Management Commands
//!
//! Lists known runs, switches the session to a previous run, and starts
//! a fresh session. Stored runs are never deleted by these commands.

use reportdeck_agent::Run;

use crate::cli::LoadArgs;
use crate::commands::AppContext;
use crate::output;
use crate::storage::store::SessionSnapshot;
use crate::utils::error::{AppError, AppResult};

pub fn list(ctx: &AppContext) -> AppResult<()> {
    let index = ctx.store.load_index()?;
    if index.is_empty() {
        println!("No runs yet. Send a message to start one.");
        return Ok(());
    }

    let current = ctx
        .store
        .load_session()?
        .current_run
        .and_then(|run| run.run_id);
    print!("{}", output::render_runs(&index, current.as_deref()));
    Ok(())
}

pub fn load(args: &LoadArgs, ctx: &AppContext) -> AppResult<()> {
    let index = ctx.store.load_index()?;
    if !index.iter().any(|entry| entry.run_id == args.run_id) {
        return Err(AppError::not_found(format!(
            "Run {} is not in the index",
            args.run_id
        )));
    }

    // Keep the remembered strict request so retry still works after
    // switching runs.
    let last_strict_request = ctx
        .store
        .load_session()?
        .current_run
        .and_then(|run| run.last_strict_request);
    let mut run = Run::resumed(args.run_id.as_str());
    run.last_strict_request = last_strict_request;
    ctx.store.save_session(&SessionSnapshot {
        current_run: Some(run),
    })?;

    let transcript = ctx.store.load_transcript(&args.run_id)?;
    println!(
        "Switched to run {} ({} messages).",
        args.run_id,
        transcript.len()
    );
    Ok(())
}

pub fn new_session(ctx: &AppContext) -> AppResult<()> {
    ctx.store.clear_current_run()?;
    println!("Started a fresh session. Previous runs stay available under runs.");
    Ok(())
}
