//! The `persondb` provider: configuration, client setup and type registry

use crate::config::ProviderSettings;
use crate::data_source::{NamesDataSource, PersonDataSource};
use crate::paths;
use crate::resource::PersonResource;
use anyhow::{Context, Result};
use declarative::{Attribute, Registry, Schema};
use persondb::Client;
use std::sync::Arc;

/// Prefix of every type this provider offers
pub const PROVIDER_TYPE: &str = "persondb";

/// Shared handle passed to every resource and data source
pub type ProviderContext = Arc<Client>;

/// Schema of the `[provider]` table
pub fn schema() -> Schema {
    Schema::new()
        .with_description("Persons database provider")
        .with_attribute(
            "database_filename",
            Attribute::optional_string().with_description(format!(
                "Path to the persons database; falls back to {}",
                paths::ENV_DATABASE
            )),
        )
}

/// Every resource and data source type, by name
pub fn registry() -> Registry<ProviderContext> {
    let mut registry = Registry::new(PROVIDER_TYPE);
    registry
        .register_resource("person", |client: &ProviderContext| {
            PersonResource::new(Arc::clone(client))
        })
        .register_data_source("person", |client: &ProviderContext| {
            PersonDataSource::new(Arc::clone(client))
        })
        .register_data_source("names", |_| NamesDataSource);
    registry
}

/// Resolve the database and open the client once for the whole run
pub fn configure(
    settings: &ProviderSettings,
    flag: Option<&str>,
    env: Option<&str>,
) -> Result<ProviderContext> {
    let path = paths::resolve_database(flag, settings.database_filename.as_deref(), env)?;
    let client = Client::open(&path)
        .with_context(|| format!("Unable to open persons database {}", path.display()))?;
    log::info!("Opened persons database {}", path.display());
    Ok(Arc::new(client))
}
