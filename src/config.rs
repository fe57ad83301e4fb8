use anyhow::{Context, Result};
use declarative::Address;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// Desired Config
// ============================================================================

/// Blocks keyed by type, then by name
type Blocks = BTreeMap<String, BTreeMap<String, toml::Table>>;

/// Everything declared in `persondb.toml`
///
/// ```toml
/// [provider]
/// database_filename = "~/persons.db"
///
/// [resource.persondb_person.alice]
/// person_id = "alice"
/// last_name = "Liddell"
///
/// [data.persondb_names.all]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesiredConfig {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub resource: Blocks,
    #[serde(default)]
    pub data: Blocks,
}

/// The `[provider]` table
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    #[serde(default)]
    pub database_filename: Option<String>,
}

impl DesiredConfig {
    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid config format")
    }

    /// Load config, failing if the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config, treating a missing file as empty
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file {} does not exist, using empty config", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Desired resources, keyed by address
    pub fn resources(&self) -> Result<BTreeMap<Address, Value>> {
        flatten(&self.resource)
    }

    /// Data source blocks, keyed by address
    pub fn data_blocks(&self) -> Result<BTreeMap<Address, Value>> {
        flatten(&self.data)
    }
}

fn flatten(blocks: &Blocks) -> Result<BTreeMap<Address, Value>> {
    let mut flat = BTreeMap::new();
    for (resource_type, named) in blocks {
        for (name, table) in named {
            let address: Address = format!("{resource_type}.{name}").parse()?;
            let value = serde_json::to_value(table)
                .with_context(|| format!("Cannot convert {address} to attributes"))?;
            flat.insert(address, value);
        }
    }
    Ok(flat)
}

// ============================================================================
// Tests
// ============================================================================
