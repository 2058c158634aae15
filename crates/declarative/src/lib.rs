//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! detecting current state, and converging systems to match the desired state.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something with state that can be managed (subnets, option definitions, reservations)
//! - **ResourceState**: The current or desired state of a resource
//! - **ExecutionPlan**: A plan grouping resources into ordered phases
//! - **Executor**: Applies phases in order, in parallel within a phase
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     Resource, ResourceState, ApplyResult, ApplyContext,
//!     ExecutionPlan, ExecuteOptions, execute_simple,
//! };
//!
//! // Define a resource
//! #[derive(Debug)]
//! struct FileResource { path: String, content: String }
//!
//! impl Resource for FileResource {
//!     fn id(&self) -> String { self.path.clone() }
//!     fn description(&self) -> String { format!("File: {}", self.path) }
//!     fn resource_type(&self) -> &'static str { "file" }
//!
//!     fn current_state(&self) -> anyhow::Result<ResourceState> {
//!         if std::path::Path::new(&self.path).exists() {
//!             Ok(ResourceState::Present { details: None })
//!         } else {
//!             Ok(ResourceState::Absent)
//!         }
//!     }
//!
//!     fn desired_state(&self) -> ResourceState {
//!         ResourceState::Present { details: None }
//!     }
//!
//!     fn apply(&self, ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> {
//!         if ctx.dry_run {
//!             return Ok(ApplyResult::Skipped { reason: "Dry run".into() });
//!         }
//!         std::fs::write(&self.path, &self.content)?;
//!         Ok(ApplyResult::Created)
//!     }
//! }
//!
//! // Build and execute a plan
//! let mut plan = ExecutionPlan::new();
//! plan.add_resource(Box::new(FileResource {
//!     path: "/tmp/test.txt".into(),
//!     content: "hello".into(),
//! }));
//!
//! let summary = execute_simple(plan, ExecuteOptions::default())?;
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback,
};
pub use diff::{DiffSummary, ResourceDiff, compute_diffs, group_by_type};
pub use executor::{execute, execute_simple};
pub use planner::ExecutionPlan;
pub use resource::{BoxedResource, Resource};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary, ResourceState};

#[cfg(test)]
pub(crate) mod testing {
    use crate::{ApplyContext, ApplyResult, Resource, ResourceState};
    use anyhow::{Result, bail};
    use std::sync::{Arc, Mutex};

    /// Resource with canned states for engine tests
    #[derive(Debug)]
    pub struct StubResource {
        kind: &'static str,
        id: String,
        current: Option<ResourceState>,
        desired: ResourceState,
        phase: u32,
        fail_with: Option<String>,
        log: Option<Arc<Mutex<Vec<String>>>>,
    }

    fn present(details: &str) -> ResourceState {
        ResourceState::Present {
            details: Some(details.to_string()),
        }
    }

    impl StubResource {
        fn new(kind: &'static str, id: &str, current: Option<ResourceState>, desired: ResourceState) -> Self {
            Self {
                kind,
                id: id.to_string(),
                current,
                desired,
                phase: 0,
                fail_with: None,
                log: None,
            }
        }

        pub fn absent(kind: &'static str, id: &str) -> Self {
            Self::new(kind, id, Some(ResourceState::Absent), present("declared"))
        }

        pub fn converged(kind: &'static str, id: &str) -> Self {
            Self::new(kind, id, Some(present("declared")), present("declared"))
        }

        pub fn modified(kind: &'static str, id: &str, from: &str, to: &str) -> Self {
            Self::new(kind, id, Some(present(from)), present(to))
        }

        pub fn removed(kind: &'static str, id: &str) -> Self {
            Self::new(kind, id, Some(present("declared")), ResourceState::Absent)
        }

        pub fn unreadable(kind: &'static str, id: &str) -> Self {
            Self::new(kind, id, None, present("declared"))
        }

        pub fn in_phase(mut self, phase: u32) -> Self {
            self.phase = phase;
            self
        }

        pub fn failing(mut self, error: &str) -> Self {
            self.fail_with = Some(error.to_string());
            self
        }

        pub fn logging(mut self, log: &Arc<Mutex<Vec<String>>>) -> Self {
            self.log = Some(Arc::clone(log));
            self
        }
    }

    impl Resource for StubResource {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn description(&self) -> String {
            format!("{} {}", self.kind, self.id)
        }

        fn resource_type(&self) -> &'static str {
            self.kind
        }

        fn phase(&self) -> u32 {
            self.phase
        }

        fn current_state(&self) -> Result<ResourceState> {
            match &self.current {
                Some(state) => Ok(state.clone()),
                None => bail!("connection refused"),
            }
        }

        fn desired_state(&self) -> ResourceState {
            self.desired.clone()
        }

        fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
            if let Some(error) = &self.fail_with {
                bail!("{error}");
            }
            let current = self.current_state()?;
            if current == self.desired {
                return Ok(ApplyResult::NoChange);
            }
            if ctx.dry_run {
                return Ok(ApplyResult::Skipped {
                    reason: "Dry run".into(),
                });
            }
            if let Some(log) = &self.log {
                log.lock().unwrap().push(self.id.clone());
            }
            Ok(match (current, &self.desired) {
                (_, ResourceState::Absent) => ApplyResult::Removed,
                (ResourceState::Absent, _) => ApplyResult::Created,
                _ => ApplyResult::Modified,
            })
        }
    }
}
