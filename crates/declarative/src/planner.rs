//! Execution planner - builds resource execution plans

use crate::resource::{BoxedResource, Resource};
use std::collections::BTreeMap;

/// An execution plan with resources grouped by phase
pub struct ExecutionPlan {
    /// Resources in declaration order
    pub resources: Vec<BoxedResource>,
    /// Run phases from highest to lowest (teardown order)
    pub reversed: bool,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            reversed: false,
        }
    }

    /// Create an empty plan that runs later phases first
    pub fn teardown() -> Self {
        Self {
            resources: Vec::new(),
            reversed: true,
        }
    }

    /// Add a resource to the plan
    pub fn add_resource(&mut self, resource: BoxedResource) {
        self.resources.push(resource);
    }

    /// Resources grouped by phase, in execution order
    pub fn phases(&self) -> Vec<(u32, Vec<&dyn Resource>)> {
        let mut phases: BTreeMap<u32, Vec<&dyn Resource>> = BTreeMap::new();
        for resource in &self.resources {
            phases
                .entry(resource.phase())
                .or_default()
                .push(resource.as_ref());
        }
        let mut ordered: Vec<_> = phases.into_iter().collect();
        if self.reversed {
            ordered.reverse();
        }
        ordered
    }

    /// Filter plan to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
            reversed: self.reversed,
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "type" or "type.name". Names may themselves contain
    /// dots, e.g. "subnet.192.168.1.0/24".
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|r| matches_filter(r, &resource_type, name.as_deref()))
            }
        }
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (String, Option<String>) {
    match target.split_once('.') {
        Some((kind, name)) => (kind.to_string(), Some(name.to_string())),
        None => (target.to_string(), None),
    }
}

/// Fold a type name so that "option-defs", "option_defs" and "option_def" agree
fn canonical_type(name: &str) -> String {
    let name = name.trim().to_lowercase().replace('-', "_");
    name.strip_suffix('s').map(str::to_string).unwrap_or(name)
}

/// Check if a resource matches the filter criteria
fn matches_filter(resource: &dyn Resource, resource_type: &str, name: Option<&str>) -> bool {
    if canonical_type(resource.resource_type()) != canonical_type(resource_type) {
        return false;
    }

    if let Some(n) = name
        && !resource.id().contains(n)
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubResource;

    fn plan() -> ExecutionPlan {
        let mut plan = ExecutionPlan::new();
        plan.add_resource(Box::new(
            StubResource::absent("reservation", "10.0.0.5").in_phase(2),
        ));
        plan.add_resource(Box::new(
            StubResource::absent("subnet", "10.0.0.0/8").in_phase(1),
        ));
        plan.add_resource(Box::new(
            StubResource::absent("subnet", "192.168.1.0/24").in_phase(1),
        ));
        plan.add_resource(Box::new(StubResource::absent("option_def", "dhcp4/222")));
        plan
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("subnets"), ("subnets".to_string(), None));
        assert_eq!(
            parse_target("subnet.192.168.1.0/24"),
            ("subnet".to_string(), Some("192.168.1.0/24".to_string()))
        );
    }

    #[test]
    fn test_type_aliases() {
        assert_eq!(canonical_type("option-defs"), "option_def");
        assert_eq!(canonical_type("option_def"), "option_def");
        assert_eq!(canonical_type("Reservations"), "reservation");
        assert_eq!(canonical_type("subnet"), "subnet");
    }

    #[test]
    fn test_phases_ordering() {
        let plan = plan();
        let order: Vec<u32> = plan.phases().iter().map(|(p, _)| *p).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(plan.phases()[1].1.len(), 2);

        let mut teardown = ExecutionPlan::teardown();
        teardown.resources = plan.resources;
        let order: Vec<u32> = teardown.phases().iter().map(|(p, _)| *p).collect();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_filter_by_target() {
        let subnets = plan().filter_by_target(Some("subnets"));
        assert_eq!(subnets.total_resources(), 2);

        let one = plan().filter_by_target(Some("subnet.192.168"));
        assert_eq!(one.total_resources(), 1);
        assert_eq!(one.resources[0].id(), "192.168.1.0/24");

        let defs = plan().filter_by_target(Some("option-defs"));
        assert_eq!(defs.total_resources(), 1);

        assert!(plan().filter_by_target(Some("leases")).is_empty());
        assert_eq!(plan().filter_by_target(None).total_resources(), 4);
    }
}
