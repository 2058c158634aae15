//! `keactl apply` and `keactl destroy`

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{AutoConfirm, ExecuteOptions, ExecuteSummary, compute_diffs, execute};

use crate::Context;
use crate::cli::{ApplyArgs, DestroyArgs, ManifestArgs};
use crate::commands::plan;
use crate::progress::{BarProgress, PromptConfirm};
use crate::resource::Ensure;
use crate::ui;

const DESTROY_JOBS: usize = 4;

pub fn apply(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    converge(
        ctx,
        &args.manifest,
        Ensure::Present,
        args.dry_run,
        args.yes,
        args.jobs,
    )
}

pub fn destroy(ctx: &Context, args: &DestroyArgs) -> Result<()> {
    converge(
        ctx,
        &args.manifest,
        Ensure::Absent,
        false,
        args.yes,
        DESTROY_JOBS,
    )
}

fn converge(
    ctx: &Context,
    manifest: &ManifestArgs,
    ensure: Ensure,
    dry_run: bool,
    yes: bool,
    jobs: usize,
) -> Result<()> {
    let plan = plan::load_plan(ctx, manifest, ensure)?;
    let diffs = compute_diffs(&plan.resources)?;
    plan::display(&diffs);

    if diffs.is_empty() {
        return Ok(());
    }

    if dry_run {
        println!();
        ui::info("Dry run - no changes made");
        return Ok(());
    }

    println!();
    let opts = ExecuteOptions {
        dry_run: false,
        jobs: jobs.max(1),
        verbose: ctx.verbose > 0,
    };
    let mut progress = if ctx.quiet {
        BarProgress::hidden()
    } else {
        BarProgress::new()
    };
    let summary = if yes {
        execute(plan, opts, &mut progress, &mut AutoConfirm)?
    } else {
        execute(plan, opts, &mut progress, &mut PromptConfirm)?
    };

    if summary.total_changes() == 0 && summary.failed == 0 && summary.skipped > 0 {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    print_summary(&summary, progress.failures());

    if !summary.is_success() {
        bail!("{} change(s) failed", summary.failed);
    }
    Ok(())
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary, failures: &[(String, String)]) {
    println!();
    if summary.is_success() {
        println!("  {} Configuration applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Configuration applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} modified", summary.modified);
    }
    if summary.removed > 0 {
        println!("    • {} removed", summary.removed);
    }
    if summary.no_change > 0 {
        println!("    • {} unchanged", summary.no_change);
    }
    if summary.failed > 0 {
        println!("    • {} {}", summary.failed, "failed".red());
        for (id, error) in failures {
            println!("      {} {} - {}", "✗".red(), id, error.dimmed());
        }
    }
}
