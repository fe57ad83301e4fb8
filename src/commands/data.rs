use super::Session;
use crate::Context;
use anyhow::{Context as _, Result};
use serde_json::{Map, Value};

/// Evaluate every matching data block and print the results as JSON
pub fn read(ctx: &Context, target: Option<&str>) -> Result<()> {
    let session = Session::open(ctx, false)?;
    let executor = session.executor();

    let mut results = Map::new();
    for (address, config) in session.config.data_blocks()? {
        if !address.matches_target(target) {
            continue;
        }
        let output = executor
            .read_data(&address.resource_type, &config)
            .with_context(|| format!("Failed to read {address}"))?;
        log::debug!("Read data {address}");
        results.insert(address.to_string(), output);
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(results))?);
    Ok(())
}
