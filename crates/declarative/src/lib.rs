//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! reading back what exists, and converging the two through a
//! create/read/update/delete lifecycle.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something with a lifecycle, described by a [`Schema`]
//! - **DataSource**: A read-only lookup
//! - **Registry**: Maps type names to constructors taking a shared context
//! - **State**: What was last recorded for each [`Address`]
//! - **ExecutionPlan**: Per-address diffs between state and desired config
//! - **Executor**: Refreshes state, applies plans, imports existing objects
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{Executor, Registry, State, plan};
//!
//! let mut registry = Registry::new("files");
//! registry.register_resource("note", |dir: &PathBuf| Note { dir: dir.clone() });
//!
//! let mut state = State::new();
//! let executor = Executor::new(&registry, &dir);
//! executor.refresh(&mut state, None)?;
//!
//! let plan = plan(&registry, &dir, &desired, &state, None)?;
//! let summary = declarative::execute_simple(&registry, &dir, &plan, &mut state)?;
//! println!("{} changes", summary.total_changes());
//! ```

pub mod address;
pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod state;
pub mod types;

// Re-export main types at crate root
pub use address::{Address, AddressError};
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{AttributeChange, DiffSummary, ResourceDiff};
pub use executor::{Executor, RefreshSummary, execute_simple};
pub use planner::{ExecutionPlan, plan, plan_destroy};
pub use registry::Registry;
pub use resource::{DataSource, DynDataSource, DynResource, Erased, Resource};
pub use schema::{Attribute, AttributeMode, Schema, ValueType};
pub use state::{ResourceInstance, State};
pub use types::{Action, ApplyResult, ExecuteOptions, ExecuteSummary, ReadOutcome};
