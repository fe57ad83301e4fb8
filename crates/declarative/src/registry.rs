//! Type-name registry for a provider's resources and data sources
//!
//! Each entry is a constructor taking the provider's configured context
//! (usually a shared API client), so resources get their dependencies
//! handed to them instead of reaching for globals.

use crate::resource::{DataSource, DynDataSource, DynResource, Erased, Resource};
use anyhow::{Result, bail};
use std::collections::BTreeMap;

type ResourceFactory<C> = Box<dyn Fn(&C) -> Box<dyn DynResource> + Send + Sync>;
type DataSourceFactory<C> = Box<dyn Fn(&C) -> Box<dyn DynDataSource> + Send + Sync>;

/// Registry of types offered by one provider
pub struct Registry<C> {
    provider: String,
    resources: BTreeMap<String, ResourceFactory<C>>,
    data_sources: BTreeMap<String, DataSourceFactory<C>>,
}

impl<C> Registry<C> {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        }
    }

    /// The provider's type name, the prefix of every registered type
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Full type name for a suffix: `<provider>_<suffix>`
    pub fn type_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.provider, suffix)
    }

    /// Register a resource under `<provider>_<suffix>`
    pub fn register_resource<R, F>(&mut self, suffix: &str, factory: F) -> &mut Self
    where
        R: Resource + 'static,
        F: Fn(&C) -> R + Send + Sync + 'static,
    {
        let name = self.type_name(suffix);
        log::debug!("Registering resource type {name}");
        self.resources.insert(
            name,
            Box::new(move |ctx: &C| -> Box<dyn DynResource> { Box::new(Erased(factory(ctx))) }),
        );
        self
    }

    /// Register a data source under `<provider>_<suffix>`
    pub fn register_data_source<D, F>(&mut self, suffix: &str, factory: F) -> &mut Self
    where
        D: DataSource + 'static,
        F: Fn(&C) -> D + Send + Sync + 'static,
    {
        let name = self.type_name(suffix);
        log::debug!("Registering data source type {name}");
        self.data_sources.insert(
            name,
            Box::new(move |ctx: &C| -> Box<dyn DynDataSource> { Box::new(Erased(factory(ctx))) }),
        );
        self
    }

    /// Construct the resource registered under `type_name`
    pub fn resource(&self, type_name: &str, ctx: &C) -> Result<Box<dyn DynResource>> {
        match self.resources.get(type_name) {
            Some(factory) => Ok(factory(ctx)),
            None => bail!("Unknown resource type: {type_name}"),
        }
    }

    /// Construct the data source registered under `type_name`
    pub fn data_source(&self, type_name: &str, ctx: &C) -> Result<Box<dyn DynDataSource>> {
        match self.data_sources.get(type_name) {
            Some(factory) => Ok(factory(ctx)),
            None => bail!("Unknown data source type: {type_name}"),
        }
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Schema};
    use crate::types::ReadOutcome;
    use serde_json::{Value, json};

    struct Greeting {
        prefix: String,
    }

    impl DataSource for Greeting {
        type Config = Value;
        type Output = Value;

        fn schema(&self) -> Schema {
            Schema::new().with_attribute("text", Attribute::computed_string())
        }

        fn read(&self, _config: Value) -> Result<Value> {
            Ok(json!({"text": format!("{} world", self.prefix)}))
        }
    }

    struct Noop;

    impl Resource for Noop {
        type State = Value;

        fn schema(&self) -> Schema {
            Schema::new()
        }
        fn create(&self, planned: Value) -> Result<Value> {
            Ok(planned)
        }
        fn read(&self, prior: Value) -> Result<ReadOutcome<Value>> {
            Ok(ReadOutcome::Present(prior))
        }
        fn update(&self, planned: Value) -> Result<Value> {
            Ok(planned)
        }
        fn delete(&self, _prior: Value) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lookup_by_type_name() {
        let mut registry: Registry<String> = Registry::new("demo");
        registry
            .register_resource("noop", |_| Noop)
            .register_data_source("greeting", |prefix: &String| Greeting {
                prefix: prefix.clone(),
            });

        let ctx = "hello".to_string();
        assert!(registry.resource("demo_noop", &ctx).is_ok());

        let source = registry.data_source("demo_greeting", &ctx).unwrap();
        assert_eq!(source.read(json!({})).unwrap()["text"], "hello world");

        assert_eq!(registry.resource_types().collect::<Vec<_>>(), vec!["demo_noop"]);
    }

    #[test]
    fn test_unknown_type() {
        let registry: Registry<()> = Registry::new("demo");
        let err = registry.resource("demo_missing", &()).err().unwrap();
        assert!(err.to_string().contains("Unknown resource type"));
    }
}
