//! Execution engine - applies plans, refreshes and imports against a registry

use crate::address::Address;
use crate::context::{ConfirmCallback, ProgressCallback};
use crate::diff::ResourceDiff;
use crate::planner::ExecutionPlan;
use crate::registry::Registry;
use crate::resource::DynResource;
use crate::state::State;
use crate::types::{Action, ApplyResult, ExecuteOptions, ExecuteSummary, ReadOutcome};
use anyhow::{Context, Result, bail};
use serde_json::Value;

/// Addresses touched by a refresh
#[derive(Debug, Clone, Default)]
pub struct RefreshSummary {
    /// Instances whose attributes were re-read
    pub refreshed: Vec<Address>,
    /// Instances dropped because the backing object is gone
    pub removed: Vec<Address>,
}

/// Runs lifecycle operations for one configured provider
pub struct Executor<'a, C> {
    registry: &'a Registry<C>,
    ctx: &'a C,
}

impl<'a, C> Executor<'a, C> {
    pub fn new(registry: &'a Registry<C>, ctx: &'a C) -> Self {
        Self { registry, ctx }
    }

    fn resource(&self, address: &Address) -> Result<Box<dyn DynResource>> {
        self.registry.resource(&address.resource_type, self.ctx)
    }

    /// Re-read every (targeted) instance in state
    ///
    /// Instances whose backing object is gone are dropped from state. Any
    /// read error aborts the refresh and leaves the instance untouched.
    pub fn refresh(&self, state: &mut State, target: Option<&str>) -> Result<RefreshSummary> {
        let mut summary = RefreshSummary::default();

        for address in state.addresses() {
            if !address.matches_target(target) {
                continue;
            }
            let Some(prior) = state.get(&address).cloned() else {
                continue;
            };

            let resource = self.resource(&address)?;
            let outcome = resource
                .read(prior)
                .with_context(|| format!("Failed to refresh {address}"))?;

            match outcome {
                ReadOutcome::Present(attributes) => {
                    state.insert(&address, attributes);
                    summary.refreshed.push(address);
                }
                ReadOutcome::Removed => {
                    log::warn!("{address} no longer exists, removing it from state");
                    state.remove(&address);
                    summary.removed.push(address);
                }
            }
        }

        Ok(summary)
    }

    /// Apply a plan, persisting state after every successful mutation
    ///
    /// Changes run one at a time in plan order. A failed change is recorded
    /// and the remaining changes still run.
    pub fn apply<P, K>(
        &self,
        plan: &ExecutionPlan,
        state: &mut State,
        opts: &ExecuteOptions,
        progress: &mut P,
        confirm: &mut K,
        mut persist: impl FnMut(&State) -> Result<()>,
    ) -> Result<ExecuteSummary>
    where
        P: ProgressCallback,
        K: ConfirmCallback,
    {
        let total_changes = plan.summary().total();

        if total_changes == 0 {
            return Ok(ExecuteSummary::default());
        }

        if opts.dry_run {
            return Ok(ExecuteSummary {
                skipped: total_changes,
                ..Default::default()
            });
        }

        // Confirm before proceeding
        if !confirm.confirm("Apply changes?")? {
            return Ok(ExecuteSummary {
                skipped: total_changes,
                ..Default::default()
            });
        }

        let mut summary = ExecuteSummary {
            no_change: plan.unchanged(),
            ..Default::default()
        };

        progress.on_batch_start(total_changes);
        for diff in plan.changes() {
            progress.on_resource_start(&diff.address, diff.action);
            let result = match self.apply_one(diff, state, &mut persist) {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("{} failed: {e:#}", diff.address);
                    ApplyResult::Failed {
                        error: format!("{e:#}"),
                    }
                }
            };
            if opts.verbose {
                log::info!("{}: {:?}", diff.address, result);
            }
            progress.on_resource_complete(&diff.address, &result);
            summary.add_result(&result);
        }
        progress.on_batch_complete();

        Ok(summary)
    }

    fn apply_one(
        &self,
        diff: &ResourceDiff,
        state: &mut State,
        persist: &mut impl FnMut(&State) -> Result<()>,
    ) -> Result<ApplyResult> {
        let resource = self.resource(&diff.address)?;
        let address = &diff.address;

        match diff.action {
            Action::NoChange => Ok(ApplyResult::NoChange),
            Action::Create => {
                let created = resource.create(planned(diff)?)?;
                state.insert(address, created);
                persist(state)?;
                Ok(ApplyResult::Created)
            }
            Action::Update => {
                let updated = resource.update(planned(diff)?)?;
                state.insert(address, updated);
                persist(state)?;
                Ok(ApplyResult::Modified)
            }
            Action::Delete => {
                resource.delete(prior(diff)?)?;
                state.remove(address);
                persist(state)?;
                Ok(ApplyResult::Removed)
            }
            Action::Replace => {
                resource.delete(prior(diff)?)?;
                state.remove(address);
                persist(state)?;

                let created = resource.create(planned(diff)?)?;
                state.insert(address, created);
                persist(state)?;
                Ok(ApplyResult::Replaced)
            }
        }
    }

    /// Adopt an existing object into state under `address`
    pub fn import(&self, state: &mut State, address: &Address, id: &str) -> Result<Value> {
        if state.contains(address) {
            bail!("{address} is already managed; remove it from state before importing");
        }

        let resource = self.resource(address)?;
        match resource
            .import(id)
            .with_context(|| format!("Failed to import {address}"))?
        {
            ReadOutcome::Present(attributes) => {
                state.insert(address, attributes.clone());
                Ok(attributes)
            }
            ReadOutcome::Removed => {
                bail!("Cannot import non-existent remote object {id:?} into {address}")
            }
        }
    }

    /// Evaluate a data source against its config
    pub fn read_data(&self, type_name: &str, config: &Value) -> Result<Value> {
        let source = self.registry.data_source(type_name, self.ctx)?;
        source.schema().validate_config(config)?;
        source.read(config.clone())
    }
}

fn planned(diff: &ResourceDiff) -> Result<Value> {
    diff.planned
        .clone()
        .with_context(|| format!("No planned state for {}", diff.address))
}

fn prior(diff: &ResourceDiff) -> Result<Value> {
    diff.prior
        .clone()
        .with_context(|| format!("No prior state for {}", diff.address))
}

/// Simple execution without callbacks or persistence
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple<C>(
    registry: &Registry<C>,
    ctx: &C,
    plan: &ExecutionPlan,
    state: &mut State,
) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    Executor::new(registry, ctx).apply(
        plan,
        state,
        &ExecuteOptions::default(),
        &mut NoProgress,
        &mut AutoConfirm,
        |_| Ok(()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, NoProgress};
    use crate::planner::{plan, plan_destroy};
    use crate::resource::{DataSource, Resource};
    use crate::schema::{Attribute, Schema};
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    /// Backing map shared by the test resource
    type Remote = Arc<Mutex<HashMap<String, String>>>;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct EntryState {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        key: String,
        value: String,
    }

    struct Entry {
        remote: Remote,
    }

    impl Resource for Entry {
        type State = EntryState;

        fn schema(&self) -> Schema {
            Schema::new()
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("key", Attribute::required_string().requires_replace())
                .with_attribute("value", Attribute::required_string())
        }

        fn create(&self, planned: EntryState) -> Result<EntryState> {
            if planned.value == "explode" {
                bail!("refusing to store {}", planned.key);
            }
            self.remote
                .lock()
                .unwrap()
                .insert(planned.key.clone(), planned.value.clone());
            Ok(EntryState {
                id: Some(format!("entry:{}", planned.key)),
                ..planned
            })
        }

        fn read(&self, prior: EntryState) -> Result<ReadOutcome<EntryState>> {
            match self.remote.lock().unwrap().get(&prior.key) {
                Some(value) => Ok(ReadOutcome::Present(EntryState {
                    value: value.clone(),
                    ..prior
                })),
                None => Ok(ReadOutcome::Removed),
            }
        }

        fn update(&self, planned: EntryState) -> Result<EntryState> {
            self.remote
                .lock()
                .unwrap()
                .insert(planned.key.clone(), planned.value.clone());
            Ok(planned)
        }

        fn delete(&self, prior: EntryState) -> Result<()> {
            match self.remote.lock().unwrap().remove(&prior.key) {
                Some(_) => Ok(()),
                None => bail!("no entry {}", prior.key),
            }
        }

        fn import(&self, id: &str) -> Result<ReadOutcome<EntryState>> {
            let key = id.strip_prefix("entry:").context("bad id")?;
            self.read(EntryState {
                id: Some(id.to_string()),
                key: key.to_string(),
                value: String::new(),
            })
        }
    }

    struct Constant;

    impl DataSource for Constant {
        type Config = Value;
        type Output = Value;

        fn schema(&self) -> Schema {
            Schema::new().with_attribute("items", Attribute::computed_string_list())
        }

        fn read(&self, _config: Value) -> Result<Value> {
            Ok(json!({"items": ["a", "b"]}))
        }
    }

    fn registry() -> Registry<Remote> {
        let mut registry = Registry::new("test");
        registry
            .register_resource("entry", |remote: &Remote| Entry {
                remote: Arc::clone(remote),
            })
            .register_data_source("constant", |_| Constant);
        registry
    }

    fn addr(name: &str) -> Address {
        Address::new("test_entry", name)
    }

    fn desired(entries: &[(&str, &str, &str)]) -> BTreeMap<Address, Value> {
        entries
            .iter()
            .map(|(name, key, value)| (addr(name), json!({"key": key, "value": value})))
            .collect()
    }

    #[test]
    fn test_execute_empty_plan() {
        let registry = registry();
        let remote = Remote::default();
        let mut state = State::new();

        let summary =
            execute_simple(&registry, &remote, &ExecutionPlan::new(), &mut state).unwrap();
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_create_update_delete() {
        let registry = registry();
        let remote = Remote::default();
        let mut state = State::new();

        let config = desired(&[("a", "k1", "one")]);
        let p = plan(&registry, &remote, &config, &state, None).unwrap();
        let summary = execute_simple(&registry, &remote, &p, &mut state).unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(state.get(&addr("a")).unwrap()["id"], "entry:k1");

        let config = desired(&[("a", "k1", "two")]);
        let p = plan(&registry, &remote, &config, &state, None).unwrap();
        let summary = execute_simple(&registry, &remote, &p, &mut state).unwrap();
        assert_eq!(summary.modified, 1);
        assert_eq!(remote.lock().unwrap()["k1"], "two");
        assert_eq!(state.get(&addr("a")).unwrap()["id"], "entry:k1");

        let p = plan_destroy(&state, None);
        let summary = execute_simple(&registry, &remote, &p, &mut state).unwrap();
        assert_eq!(summary.removed, 1);
        assert!(state.is_empty());
        assert!(remote.lock().unwrap().is_empty());
    }

    #[test]
    fn test_replace_on_key_change() {
        let registry = registry();
        let remote = Remote::default();
        let mut state = State::new();

        let p = plan(&registry, &remote, &desired(&[("a", "k1", "v")]), &state, None).unwrap();
        execute_simple(&registry, &remote, &p, &mut state).unwrap();

        let p = plan(&registry, &remote, &desired(&[("a", "k2", "v")]), &state, None).unwrap();
        let summary = execute_simple(&registry, &remote, &p, &mut state).unwrap();

        assert_eq!(summary.replaced, 1);
        let remote = remote.lock().unwrap();
        assert!(!remote.contains_key("k1"));
        assert!(remote.contains_key("k2"));
        assert_eq!(state.get(&addr("a")).unwrap()["id"], "entry:k2");
    }

    #[test]
    fn test_failure_does_not_stop_others() {
        let registry = registry();
        let remote = Remote::default();
        let mut state = State::new();

        let config = desired(&[("a", "k1", "explode"), ("b", "k2", "fine")]);
        let p = plan(&registry, &remote, &config, &state, None).unwrap();
        let summary = execute_simple(&registry, &remote, &p, &mut state).unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.created, 1);
        assert!(!state.contains(&addr("a")));
        assert!(state.contains(&addr("b")));
    }

    #[test]
    fn test_failed_delete_keeps_state() {
        let registry = registry();
        let remote = Remote::default();
        let mut state = State::new();
        state.insert(&addr("a"), json!({"id": "entry:k1", "key": "k1", "value": "v"}));

        let summary =
            execute_simple(&registry, &remote, &plan_destroy(&state, None), &mut state).unwrap();

        assert_eq!(summary.failed, 1);
        assert!(state.contains(&addr("a")));
    }

    #[test]
    fn test_persist_after_each_change() {
        let registry = registry();
        let remote = Remote::default();
        let mut state = State::new();
        let mut snapshots = Vec::new();

        let config = desired(&[("a", "k1", "v"), ("b", "k2", "v")]);
        let p = plan(&registry, &remote, &config, &state, None).unwrap();
        Executor::new(&registry, &remote)
            .apply(
                &p,
                &mut state,
                &ExecuteOptions::default(),
                &mut NoProgress,
                &mut AutoConfirm,
                |s| {
                    snapshots.push(s.len());
                    Ok(())
                },
            )
            .unwrap();

        assert_eq!(snapshots, vec![1, 2]);
    }

    #[test]
    fn test_dry_run_and_decline() {
        let registry = registry();
        let remote = Remote::default();
        let mut state = State::new();
        let executor = Executor::new(&registry, &remote);

        let p = plan(&registry, &remote, &desired(&[("a", "k1", "v")]), &state, None).unwrap();

        let opts = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = executor
            .apply(&p, &mut state, &opts, &mut NoProgress, &mut AutoConfirm, |_| Ok(()))
            .unwrap();
        assert_eq!(summary.skipped, 1);

        let summary = executor
            .apply(
                &p,
                &mut state,
                &ExecuteOptions::default(),
                &mut NoProgress,
                &mut AutoDecline,
                |_| Ok(()),
            )
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(state.is_empty());
        assert!(remote.lock().unwrap().is_empty());
    }

    #[test]
    fn test_refresh_drops_vanished() {
        let registry = registry();
        let remote = Remote::default();
        remote.lock().unwrap().insert("k1".into(), "changed".into());

        let mut state = State::new();
        state.insert(&addr("a"), json!({"id": "entry:k1", "key": "k1", "value": "v"}));
        state.insert(&addr("b"), json!({"id": "entry:k2", "key": "k2", "value": "v"}));

        let summary = Executor::new(&registry, &remote)
            .refresh(&mut state, None)
            .unwrap();

        assert_eq!(summary.refreshed, vec![addr("a")]);
        assert_eq!(summary.removed, vec![addr("b")]);
        assert_eq!(state.get(&addr("a")).unwrap()["value"], "changed");
        assert!(!state.contains(&addr("b")));
    }

    #[test]
    fn test_import() {
        let registry = registry();
        let remote = Remote::default();
        remote.lock().unwrap().insert("k1".into(), "v".into());
        let executor = Executor::new(&registry, &remote);
        let mut state = State::new();

        let imported = executor.import(&mut state, &addr("a"), "entry:k1").unwrap();
        assert_eq!(imported["key"], "k1");
        assert!(state.contains(&addr("a")));

        let err = executor
            .import(&mut state, &addr("a"), "entry:k1")
            .unwrap_err();
        assert!(err.to_string().contains("already managed"));

        let err = executor
            .import(&mut state, &addr("b"), "entry:missing")
            .unwrap_err();
        assert!(err.to_string().contains("non-existent"));
        assert!(!state.contains(&addr("b")));
    }

    #[test]
    fn test_read_data() {
        let registry = registry();
        let remote = Remote::default();
        let executor = Executor::new(&registry, &remote);

        let output = executor.read_data("test_constant", &json!({})).unwrap();
        assert_eq!(output["items"], json!(["a", "b"]));

        assert!(executor.read_data("test_constant", &json!({"items": []})).is_err());
    }
}
