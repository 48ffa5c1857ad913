//! Show Command
//!
//! Renders the current run's stored report. The raw report is normalized
//! on the way out and the optional what-if revenue override is applied
//! to the displayed copy only.

use reportdeck_core::{apply_revenue_override, normalize_report};

use crate::cli::ShowArgs;
use crate::commands::AppContext;
use crate::output;
use crate::utils::error::AppResult;

pub fn run(args: &ShowArgs, ctx: &AppContext) -> AppResult<()> {
    let (run_id, raw) = ctx.current_report()?;
    let report = apply_revenue_override(&normalize_report(&raw), args.override_revenue);
    print!("{}", output::render_report(&run_id, &report, args.growth));
    Ok(())
}
