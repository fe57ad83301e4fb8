//! Execution planner - turns desired config and recorded state into a plan

use crate::address::Address;
use crate::diff::{DiffSummary, ResourceDiff};
use crate::registry::Registry;
use crate::schema::Schema;
use crate::state::State;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Ordered list of per-resource diffs
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub diffs: Vec<ResourceDiff>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs that change something
    pub fn changes(&self) -> impl Iterator<Item = &ResourceDiff> {
        self.diffs.iter().filter(|d| d.action.is_change())
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_diffs(&self.diffs)
    }

    /// Number of diffs that change nothing
    pub fn unchanged(&self) -> usize {
        self.diffs.len() - self.summary().total()
    }

    /// Check if the plan changes nothing
    pub fn is_empty(&self) -> bool {
        !self.summary().has_changes()
    }
}

/// Plan the changes that bring `state` to the desired config
///
/// Each desired block is validated against its type's schema first; every
/// problem across all blocks is reported together. `state` should already
/// be refreshed.
pub fn plan<C>(
    registry: &Registry<C>,
    ctx: &C,
    desired: &BTreeMap<Address, Value>,
    state: &State,
    target: Option<&str>,
) -> Result<ExecutionPlan> {
    let mut schemas: BTreeMap<String, Schema> = BTreeMap::new();
    let mut problems = Vec::new();

    for (address, config) in desired {
        let schema = schema_for(registry, ctx, &mut schemas, &address.resource_type)?;
        for problem in schema.diagnostics(config) {
            problems.push(format!("{address}: {problem}"));
        }
    }

    if !problems.is_empty() {
        anyhow::bail!("Invalid configuration:\n  {}", problems.join("\n  "));
    }

    let addresses: BTreeSet<Address> = desired
        .keys()
        .cloned()
        .chain(state.addresses())
        .filter(|a| a.matches_target(target))
        .collect();

    let mut plan = ExecutionPlan::new();
    for address in addresses {
        let schema = schema_for(registry, ctx, &mut schemas, &address.resource_type)?.clone();
        let prior = state.get(&address);
        let wanted = desired.get(&address);
        let diff = ResourceDiff::compute(address, &schema, prior, wanted);
        log::debug!("Planned {} for {}", diff.action, diff.address);
        plan.diffs.push(diff);
    }

    Ok(plan)
}

/// Plan the deletion of every (targeted) instance in state
pub fn plan_destroy(state: &State, target: Option<&str>) -> ExecutionPlan {
    let empty = Schema::new();
    let diffs = state
        .addresses()
        .into_iter()
        .filter(|a| a.matches_target(target))
        .map(|address| {
            let prior = state.get(&address).cloned();
            ResourceDiff::compute(address, &empty, prior.as_ref(), None)
        })
        .collect();
    ExecutionPlan { diffs }
}

fn schema_for<'s, C>(
    registry: &Registry<C>,
    ctx: &C,
    cache: &'s mut BTreeMap<String, Schema>,
    resource_type: &str,
) -> Result<&'s Schema> {
    if !cache.contains_key(resource_type) {
        let schema = registry
            .resource(resource_type, ctx)
            .with_context(|| format!("Cannot plan {resource_type}"))?
            .schema();
        cache.insert(resource_type.to_string(), schema);
    }
    cache
        .get(resource_type)
        .ok_or_else(|| anyhow::anyhow!("Schema for {resource_type} disappeared"))
}
