//! Command implementations
//!
//! Every command that touches resources opens a [`Session`]: the desired
//! config, the state file, and the provider configured once with its
//! shared client.

pub mod data;
pub mod db;
pub mod import;
pub mod plan;
pub mod schema;
pub mod state;

use crate::Context;
use crate::config::DesiredConfig;
use crate::paths;
use crate::provider::{self, ProviderContext};
use crate::state::StateFile;
use anyhow::Result;
use declarative::{Executor, Registry};

/// Everything a resource command works with
pub struct Session {
    pub config: DesiredConfig,
    pub state: StateFile,
    pub client: ProviderContext,
    pub registry: Registry<ProviderContext>,
}

impl Session {
    /// Load config and state, then configure the provider
    ///
    /// With `require_config` unset, a missing config file reads as empty so
    /// commands that only need the database still work.
    pub fn open(ctx: &Context, require_config: bool) -> Result<Self> {
        let config = if require_config {
            DesiredConfig::load(&ctx.config_path)?
        } else {
            DesiredConfig::load_or_default(&ctx.config_path)?
        };

        let client = open_client(ctx, &config)?;
        let state = StateFile::load(&ctx.state_path)?;

        Ok(Self {
            config,
            state,
            client,
            registry: provider::registry(),
        })
    }

    pub fn executor(&self) -> Executor<'_, ProviderContext> {
        Executor::new(&self.registry, &self.client)
    }
}

/// Configure the provider from flag, config and environment
pub fn open_client(ctx: &Context, config: &DesiredConfig) -> Result<ProviderContext> {
    let env = std::env::var(paths::ENV_DATABASE).ok();
    provider::configure(&config.provider, ctx.database.as_deref(), env.as_deref())
}
