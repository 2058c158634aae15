//! Execution engine - applies resources phase by phase, in parallel within a phase

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diff::compute_diffs;
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;

/// Execute a plan with the given options and callbacks
///
/// # Type Parameters
/// * `P` - Progress callback type
/// * `C` - Confirm callback type
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run, jobs, verbose)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback
///
/// # Returns
/// Summary of execution results. Only resources with a pending diff are
/// applied; converged resources count as `no_change`.
pub fn execute<P, C>(
    plan: ExecutionPlan,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let diffs = compute_diffs(&plan.resources)?;
    let total = plan.total_resources();

    if diffs.is_empty() {
        return Ok(ExecuteSummary {
            no_change: total,
            ..Default::default()
        });
    }

    let pending_summary = ExecuteSummary {
        skipped: diffs.len(),
        no_change: total - diffs.len(),
        ..Default::default()
    };

    if opts.dry_run {
        return Ok(pending_summary);
    }

    let prompt = format!("Apply {} change(s)?", diffs.len());
    if !confirm.confirm(&prompt)? {
        return Ok(pending_summary);
    }

    let pending: HashSet<(String, String)> = diffs
        .into_iter()
        .map(|d| (d.resource_type, d.resource_id))
        .collect();

    let mut summary = ExecuteSummary::default();

    for (phase, resources) in plan.phases() {
        let (todo, converged): (Vec<&dyn Resource>, Vec<&dyn Resource>) =
            resources.into_iter().partition(|r| {
                pending.contains(&(r.resource_type().to_string(), r.id()))
            });
        summary.no_change += converged.len();

        if todo.is_empty() {
            continue;
        }

        log::debug!("Applying phase {} ({} resource(s))", phase, todo.len());
        progress.on_batch_start(todo.len(), phase);
        let results = execute_batch(&todo, opts.jobs, opts.verbose, progress)?;
        for result in &results {
            summary.add_result(result);
        }
        progress.on_batch_complete();
    }

    Ok(summary)
}

/// Execute a batch of resources
fn execute_batch<P: ProgressCallback>(
    resources: &[&dyn Resource],
    jobs: usize,
    verbose: bool,
    progress: &mut P,
) -> Result<Vec<ApplyResult>> {
    let sequential =
        jobs <= 1 || resources.len() == 1 || resources.iter().any(|r| !r.can_parallelize());

    if sequential {
        let mut results = Vec::with_capacity(resources.len());
        for resource in resources {
            progress.on_resource_start(&resource.id(), &resource.description());
            let result = apply_resource(*resource, verbose);
            progress.on_resource_complete(&resource.id(), &result);
            results.push(result);
        }
        Ok(results)
    } else {
        execute_parallel(resources, jobs, verbose, progress)
    }
}

/// Execute resources in parallel using rayon
fn execute_parallel<P: ProgressCallback>(
    resources: &[&dyn Resource],
    jobs: usize,
    verbose: bool,
    progress: &mut P,
) -> Result<Vec<ApplyResult>> {
    // The progress callback is not thread-safe; results are reported after the batch.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to create thread pool")?;

    let results: Vec<(String, ApplyResult)> = pool.install(|| {
        resources
            .par_iter()
            .map(|resource| (resource.id(), apply_resource(*resource, verbose)))
            .collect()
    });

    for (id, result) in &results {
        progress.on_resource_complete(id, result);
    }

    Ok(results.into_iter().map(|(_, r)| r).collect())
}

/// Apply a single resource
fn apply_resource(resource: &dyn Resource, verbose: bool) -> ApplyResult {
    let mut ctx = ApplyContext::new(false, verbose);

    match resource.apply(&mut ctx) {
        Ok(result) => result,
        Err(e) => {
            log::warn!("{} {} failed: {:#}", resource.resource_type(), resource.id(), e);
            ApplyResult::Failed {
                error: format!("{e:#}"),
            }
        }
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(plan: ExecutionPlan, opts: ExecuteOptions) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, &mut NoProgress, &mut AutoConfirm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoDecline, NoProgress};
    use crate::testing::StubResource;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_execute_empty_plan() {
        let result = execute_simple(ExecutionPlan::new(), ExecuteOptions::default()).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_execute_no_changes() {
        let mut plan = ExecutionPlan::new();
        plan.add_resource(Box::new(StubResource::converged("subnet", "10.0.0.0/8")));

        let result = execute_simple(plan, ExecuteOptions::default()).unwrap();
        assert_eq!(result.no_change, 1);
        assert_eq!(result.total_changes(), 0);
    }

    #[test]
    fn test_execute_with_changes() {
        let mut plan = ExecutionPlan::new();
        plan.add_resource(Box::new(StubResource::absent("subnet", "10.0.0.0/8")));
        plan.add_resource(Box::new(StubResource::modified(
            "subnet",
            "10.1.0.0/16",
            "pools: 1",
            "pools: 2",
        )));
        plan.add_resource(Box::new(StubResource::removed("reservation", "10.0.0.5")));
        plan.add_resource(Box::new(StubResource::converged("subnet", "10.2.0.0/16")));

        let result = execute_simple(plan, ExecuteOptions::default()).unwrap();
        assert_eq!(result.created, 1);
        assert_eq!(result.modified, 1);
        assert_eq!(result.removed, 1);
        assert_eq!(result.no_change, 1);
    }

    #[test]
    fn test_dry_run_and_decline_skip() {
        let mut plan = ExecutionPlan::new();
        plan.add_resource(Box::new(StubResource::absent("subnet", "10.0.0.0/8")));
        let opts = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };
        let result = execute_simple(plan, opts).unwrap();
        assert_eq!(result.skipped, 1);
        assert_eq!(result.total_changes(), 0);

        let mut plan = ExecutionPlan::new();
        plan.add_resource(Box::new(StubResource::absent("subnet", "10.0.0.0/8")));
        let result = execute(
            plan,
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoDecline,
        )
        .unwrap();
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_failures_are_counted() {
        let mut plan = ExecutionPlan::new();
        plan.add_resource(Box::new(
            StubResource::absent("subnet", "10.0.0.0/8").failing("result 4: conflict"),
        ));
        plan.add_resource(Box::new(StubResource::absent("subnet", "10.1.0.0/16")));

        let result = execute_simple(plan, ExecuteOptions::default()).unwrap();
        assert_eq!(result.failed, 1);
        assert_eq!(result.created, 1);
        assert!(!result.is_success());
    }

    #[test]
    fn test_phases_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut plan = ExecutionPlan::new();
        plan.add_resource(Box::new(
            StubResource::absent("reservation", "10.0.0.5")
                .in_phase(2)
                .logging(&log),
        ));
        plan.add_resource(Box::new(
            StubResource::absent("subnet", "10.0.0.0/8")
                .in_phase(1)
                .logging(&log),
        ));
        plan.add_resource(Box::new(
            StubResource::absent("option_def", "dhcp4/222").logging(&log),
        ));

        execute_simple(plan, ExecuteOptions::default()).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["dhcp4/222", "10.0.0.0/8", "10.0.0.5"]
        );
    }

    #[test]
    fn test_read_failure_aborts() {
        let mut plan = ExecutionPlan::new();
        plan.add_resource(Box::new(StubResource::unreadable("subnet", "10.0.0.0/8")));
        assert!(execute_simple(plan, ExecuteOptions::default()).is_err());
    }
}
