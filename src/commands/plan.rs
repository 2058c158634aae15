//! `keactl plan` - preview what apply would change

use anyhow::Result;
use colored::Colorize;
use declarative::{DiffSummary, ExecutionPlan, ResourceDiff, compute_diffs, group_by_type};
use std::sync::Arc;

use crate::Context;
use crate::cli::ManifestArgs;
use crate::manifest::Manifest;
use crate::resource::{Ensure, build_plan};
use crate::ui;

pub fn run(ctx: &Context, args: &ManifestArgs) -> Result<()> {
    let plan = load_plan(ctx, args, Ensure::Present)?;
    let diffs = compute_diffs(&plan.resources)?;
    display(&diffs);
    Ok(())
}

/// Load the manifest and turn it into a filtered execution plan
pub fn load_plan(ctx: &Context, args: &ManifestArgs, ensure: Ensure) -> Result<ExecutionPlan> {
    let manifest = Manifest::load(&args.manifest)?;
    log::debug!(
        "Loaded {} entries from {}",
        manifest.len(),
        args.manifest.display()
    );

    let client = Arc::new(ctx.client()?);
    let plan = build_plan(&manifest, &client, ctx.settings.hostname.as_deref(), ensure)?
        .filter_by_target(args.target.as_deref());

    if plan.is_empty() {
        match &args.target {
            Some(target) => ui::warn(&format!("Nothing in the manifest matches `{target}`")),
            None => ui::warn("The manifest declares nothing"),
        }
    }
    Ok(plan)
}

/// Print diffs grouped by resource type
pub fn display(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes. The servers match the manifest.", "✓".green());
        return;
    }

    ui::header("Plan");
    for (resource_type, group) in group_by_type(diffs) {
        ui::section(ui::type_label(&resource_type));
        for diff in group {
            ui::print_diff(diff);
        }
    }

    println!();
    println!("  {}", summary_line(&DiffSummary::from_diffs(diffs)).bold());
}

fn summary_line(summary: &DiffSummary) -> String {
    format!(
        "Plan: {} to add, {} to change, {} to remove.",
        summary.additions, summary.modifications, summary.removals
    )
}
