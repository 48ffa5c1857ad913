//! Export Command
//!
//! Writes the current run's report to a JSON file. The exported document
//! is the normalized report with any what-if revenue override applied,
//! matching what `show` displays.

use std::path::PathBuf;

use reportdeck_core::{apply_revenue_override, normalize_report};

use crate::cli::ExportArgs;
use crate::commands::AppContext;
use crate::utils::error::AppResult;

pub fn run(args: &ExportArgs, ctx: &AppContext) -> AppResult<()> {
    let (run_id, raw) = ctx.current_report()?;
    let report = apply_revenue_override(&normalize_report(&raw), args.override_revenue);

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("business-report-{}.json", run_id)));
    std::fs::write(&path, report.to_pretty_json()?)?;

    println!("Exported report for run {} to {}", run_id, path.display());
    Ok(())
}
