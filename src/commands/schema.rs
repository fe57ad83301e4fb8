use crate::provider::{self, ProviderContext};
use anyhow::Result;
use declarative::{Registry, Schema};
use persondb::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Every schema the provider exposes
#[derive(Debug, Serialize)]
pub struct ProviderSchemas {
    /// Provider type name, the prefix of every type below
    pub name: String,
    pub provider: Schema,
    pub resources: BTreeMap<String, Schema>,
    pub data_sources: BTreeMap<String, Schema>,
}

/// Collect schemas from the registry
///
/// Building a resource needs a provider context, so this uses a throwaway
/// in-memory client that is never queried.
pub fn collect(registry: &Registry<ProviderContext>) -> Result<ProviderSchemas> {
    let ctx: ProviderContext = Arc::new(Client::in_memory());

    let mut resources = BTreeMap::new();
    for type_name in registry.resource_types() {
        let schema = registry.resource(type_name, &ctx)?.schema();
        resources.insert(type_name.to_string(), schema);
    }

    let mut data_sources = BTreeMap::new();
    for type_name in registry.data_source_types() {
        let schema = registry.data_source(type_name, &ctx)?.schema();
        data_sources.insert(type_name.to_string(), schema);
    }

    Ok(ProviderSchemas {
        name: registry.provider().to_string(),
        provider: provider::schema(),
        resources,
        data_sources,
    })
}

pub fn run() -> Result<()> {
    let schemas = collect(&provider::registry())?;
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}
