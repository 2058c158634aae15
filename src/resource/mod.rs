//! Manifest entities as declarative resources
//!
//! Every managed entity is wrapped in a [`Managed`] resource which drives it
//! through its keakit lifecycle adapter:
//! - State detection reads the entity back from the server
//! - Apply creates, updates or deletes until the server matches
//! - Phases order definitions before subnets before reservations

mod option_def;
mod reservation;
mod subnet;

use anyhow::{Context, Result};
use declarative::{ApplyContext, ApplyResult, ExecutionPlan, Resource, ResourceState};
use keakit::Client;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::manifest::{Entry, Manifest};

/// Whether an entity should exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensure {
    Present,
    Absent,
}

/// One kind of server-side entity
pub trait Entity: Serialize + Clone + fmt::Debug + Send + Sync + 'static {
    /// Resource type used for filtering and display
    const KIND: &'static str;
    /// Execution phase; definitions first, reservations last
    const PHASE: u32;

    /// Natural key shown to the user
    fn label(&self) -> String;

    /// Read the entity as it exists on `host`
    fn read(&self, client: &Client, host: &str) -> keakit::Result<Option<Self>>;

    fn create(&self, client: &Client, host: &str) -> keakit::Result<()>;

    fn update(&self, client: &Client, host: &str) -> keakit::Result<()>;

    fn delete(&self, client: &Client, host: &str) -> keakit::Result<()>;

    /// Whether `observed` satisfies this declaration
    fn converged_with(&self, observed: &Self) -> bool;

    /// Text shown in plan diffs
    fn render(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| format!("{self:#?}"))
    }
}

/// A manifest entity bound to a client and host
pub struct Managed<E: Entity> {
    client: Arc<Client>,
    host: String,
    entity: E,
    ensure: Ensure,
}

impl<E: Entity> Managed<E> {
    pub fn new(client: Arc<Client>, host: impl Into<String>, entity: E, ensure: Ensure) -> Self {
        Self {
            client,
            host: host.into(),
            entity,
            ensure,
        }
    }

    fn observe(&self) -> Result<Option<E>> {
        self.entity
            .read(&self.client, &self.host)
            .with_context(|| format!("Failed to read {} {}", E::KIND, self.entity.label()))
    }
}

impl<E: Entity> fmt::Debug for Managed<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Managed")
            .field("host", &self.host)
            .field("entity", &self.entity)
            .field("ensure", &self.ensure)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> Resource for Managed<E> {
    fn id(&self) -> String {
        format!("{}@{}", self.entity.label(), self.host)
    }

    fn description(&self) -> String {
        match self.ensure {
            Ensure::Present => format!("Ensure {} {} on {}", E::KIND, self.entity.label(), self.host),
            Ensure::Absent => format!("Remove {} {} from {}", E::KIND, self.entity.label(), self.host),
        }
    }

    fn resource_type(&self) -> &'static str {
        E::KIND
    }

    fn phase(&self) -> u32 {
        E::PHASE
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(match self.observe()? {
            None => ResourceState::Absent,
            Some(observed) => {
                let shown = if self.ensure == Ensure::Present && self.entity.converged_with(&observed) {
                    &self.entity
                } else {
                    &observed
                };
                ResourceState::Present {
                    details: Some(shown.render()),
                }
            }
        })
    }

    fn desired_state(&self) -> ResourceState {
        match self.ensure {
            Ensure::Present => ResourceState::Present {
                details: Some(self.entity.render()),
            },
            Ensure::Absent => ResourceState::Absent,
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        let observed = self.observe()?;

        let pending = match (self.ensure, &observed) {
            (Ensure::Present, None) => ApplyResult::Created,
            (Ensure::Present, Some(o)) if !self.entity.converged_with(o) => ApplyResult::Modified,
            (Ensure::Absent, Some(_)) => ApplyResult::Removed,
            _ => return Ok(ApplyResult::NoChange),
        };

        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".into(),
            });
        }

        let label = self.entity.label();
        match pending {
            ApplyResult::Created => self
                .entity
                .create(&self.client, &self.host)
                .with_context(|| format!("Failed to create {} {label}", E::KIND))?,
            ApplyResult::Modified => self
                .entity
                .update(&self.client, &self.host)
                .with_context(|| format!("Failed to update {} {label}", E::KIND))?,
            _ => self
                .entity
                .delete(&self.client, &self.host)
                .with_context(|| format!("Failed to delete {} {label}", E::KIND))?,
        }

        if ctx.verbose {
            log::info!("{} {label} on {}: {pending:?}", E::KIND, self.host);
        }
        Ok(pending)
    }
}

fn add_entries<E: Entity>(
    plan: &mut ExecutionPlan,
    client: &Arc<Client>,
    entries: &[Entry<E>],
    default_host: Option<&str>,
    ensure: Ensure,
) -> Result<()> {
    for entry in entries {
        let host = entry.host(default_host)?;
        plan.add_resource(Box::new(Managed::new(
            Arc::clone(client),
            host,
            entry.state.clone(),
            ensure,
        )));
    }
    Ok(())
}

/// Build an execution plan for every manifest entry.
///
/// With [`Ensure::Absent`] the plan removes the entries, reservations first.
pub fn build_plan(
    manifest: &Manifest,
    client: &Arc<Client>,
    default_host: Option<&str>,
    ensure: Ensure,
) -> Result<ExecutionPlan> {
    manifest.check_duplicates(default_host)?;

    let mut plan = match ensure {
        Ensure::Present => ExecutionPlan::new(),
        Ensure::Absent => ExecutionPlan::teardown(),
    };
    add_entries(&mut plan, client, &manifest.option_defs, default_host, ensure)?;
    add_entries(&mut plan, client, &manifest.subnets, default_host, ensure)?;
    add_entries(&mut plan, client, &manifest.reservations, default_host, ensure)?;
    Ok(plan)
}
