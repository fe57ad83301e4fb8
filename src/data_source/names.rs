//! `persondb_names` data source: a fixed list of names

use anyhow::Result;
use declarative::{Attribute, DataSource, Schema};
use serde::Serialize;
use serde_json::Value;

const NAMES: &[&str] = &["Alice", "Bob", "Carol", "Dave", "Eve"];

#[derive(Debug, Serialize)]
pub struct Names {
    pub id: &'static str,
    pub names: Vec<&'static str>,
}

/// Needs no store access
pub struct NamesDataSource;

impl DataSource for NamesDataSource {
    type Config = Value;
    type Output = Names;

    fn schema(&self) -> Schema {
        Schema::new()
            .with_description("A fixed list of names")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("names", Attribute::computed_string_list())
    }

    fn read(&self, _config: Value) -> Result<Names> {
        Ok(Names {
            id: "names",
            names: NAMES.to_vec(),
        })
    }
}
