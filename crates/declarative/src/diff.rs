//! Diff computation between recorded and desired state

use crate::address::Address;
use crate::schema::Schema;
use crate::types::Action;
use serde::Serialize;
use serde_json::{Map, Value};

/// One attribute whose value changes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    pub name: String,
    pub before: Value,
    pub after: Value,
    /// The change cannot be made in place
    pub forces_replace: bool,
}

/// Planned change for a single resource instance
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDiff {
    pub address: Address,
    pub action: Action,
    /// Configurable attributes that differ
    pub changes: Vec<AttributeChange>,
    /// State as last recorded (and refreshed)
    pub prior: Option<Value>,
    /// State to hand to create or update
    pub planned: Option<Value>,
}

impl ResourceDiff {
    /// Compare recorded state with desired config under a schema
    ///
    /// Only configurable attributes take part in the comparison. Computed
    /// attributes are carried over from the prior state on update and left
    /// for the resource to fill in on create.
    pub fn compute(
        address: Address,
        schema: &Schema,
        prior: Option<&Value>,
        desired: Option<&Value>,
    ) -> Self {
        let changes = attribute_changes(schema, prior, desired);

        let (action, planned) = match (prior, desired) {
            (None, None) => (Action::NoChange, None),
            (None, Some(desired)) => (Action::Create, Some(desired.clone())),
            (Some(_), None) => (Action::Delete, None),
            (Some(prior), Some(desired)) => {
                if changes.iter().any(|c| c.forces_replace) {
                    (Action::Replace, Some(desired.clone()))
                } else if !changes.is_empty() {
                    (Action::Update, Some(merge_planned(schema, prior, desired)))
                } else {
                    (Action::NoChange, Some(prior.clone()))
                }
            }
        };

        Self {
            address,
            action,
            changes,
            prior: prior.cloned(),
            planned,
        }
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        self.action == Action::Create
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        self.action == Action::Delete
    }

    /// Check if this diff represents an in-place modification
    pub fn is_modification(&self) -> bool {
        self.action == Action::Update
    }

    /// Check if this diff represents a replacement
    pub fn is_replacement(&self) -> bool {
        self.action == Action::Replace
    }
}

fn attribute_changes(
    schema: &Schema,
    prior: Option<&Value>,
    desired: Option<&Value>,
) -> Vec<AttributeChange> {
    schema
        .configurable()
        .filter_map(|(name, attr)| {
            let before = attr.normalize(prior.and_then(|p| p.get(name)));
            let after = attr.normalize(desired.and_then(|d| d.get(name)));
            (before != after).then(|| AttributeChange {
                name: name.to_string(),
                before,
                after,
                forces_replace: attr.requires_replace && prior.is_some() && desired.is_some(),
            })
        })
        .collect()
}

/// Prior state with every configurable attribute taken from config
fn merge_planned(schema: &Schema, prior: &Value, desired: &Value) -> Value {
    let mut merged = prior.as_object().cloned().unwrap_or_else(Map::new);
    for (name, attr) in schema.configurable() {
        merged.insert(name.to_string(), attr.normalize(desired.get(name)));
    }
    Value::Object(merged)
}

/// Summary of diffs for display
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffSummary {
    pub additions: usize,
    pub updates: usize,
    pub replacements: usize,
    pub removals: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action {
                Action::Create => summary.additions += 1,
                Action::Update => summary.updates += 1,
                Action::Replace => summary.replacements += 1,
                Action::Delete => summary.removals += 1,
                Action::NoChange => {}
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.updates + self.replacements + self.removals
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
