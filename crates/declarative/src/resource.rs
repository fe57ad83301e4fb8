//! Resource and data source traits
//!
//! A [`Resource`] is something with a lifecycle: it can be created, read
//! back, updated, deleted and imported. A [`DataSource`] is read-only.
//!
//! Both are written against typed state. The planner and executor only see
//! [`DynResource`] and [`DynDataSource`], which carry state as JSON values;
//! [`Erased`] bridges the two.

use crate::schema::Schema;
use crate::types::ReadOutcome;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Core trait for managed resources
///
/// # Example
///
/// ```ignore
/// use declarative::{ReadOutcome, Resource, Schema, Attribute};
///
/// struct Note { dir: std::path::PathBuf }
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct NoteState { name: String, body: String }
///
/// impl Resource for Note {
///     type State = NoteState;
///
///     fn schema(&self) -> Schema {
///         Schema::new()
///             .with_attribute("name", Attribute::required_string().requires_replace())
///             .with_attribute("body", Attribute::required_string())
///     }
///
///     fn create(&self, planned: NoteState) -> anyhow::Result<NoteState> {
///         std::fs::write(self.dir.join(&planned.name), &planned.body)?;
///         Ok(planned)
///     }
///
///     fn read(&self, prior: NoteState) -> anyhow::Result<ReadOutcome<NoteState>> {
///         match std::fs::read_to_string(self.dir.join(&prior.name)) {
///             Ok(body) => Ok(ReadOutcome::Present(NoteState { body, ..prior })),
///             Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ReadOutcome::Removed),
///             Err(e) => Err(e.into()),
///         }
///     }
///
///     fn update(&self, planned: NoteState) -> anyhow::Result<NoteState> {
///         self.create(planned)
///     }
///
///     fn delete(&self, prior: NoteState) -> anyhow::Result<()> {
///         Ok(std::fs::remove_file(self.dir.join(&prior.name))?)
///     }
/// }
/// ```
pub trait Resource: Send + Sync {
    /// Typed form of the resource's attributes
    type State: Serialize + DeserializeOwned;

    /// Attributes this resource understands
    fn schema(&self) -> Schema;

    /// Create the resource; returns the new state including computed attributes
    fn create(&self, planned: Self::State) -> Result<Self::State>;

    /// Read the resource back
    ///
    /// Return [`ReadOutcome::Removed`] only when the resource is known to be
    /// gone. Any failure to find out must be an error.
    fn read(&self, prior: Self::State) -> Result<ReadOutcome<Self::State>>;

    /// Update the resource in place
    fn update(&self, planned: Self::State) -> Result<Self::State>;

    /// Delete the resource
    fn delete(&self, prior: Self::State) -> Result<()>;

    /// Adopt an existing resource by its identity string
    fn import(&self, id: &str) -> Result<ReadOutcome<Self::State>> {
        bail!("resource does not support import (id: {id})")
    }
}

/// Read-only lookups
pub trait DataSource: Send + Sync {
    type Config: DeserializeOwned;
    type Output: Serialize;

    fn schema(&self) -> Schema;

    fn read(&self, config: Self::Config) -> Result<Self::Output>;
}

/// Resource with state carried as JSON
pub trait DynResource: Send + Sync {
    fn schema(&self) -> Schema;
    fn create(&self, planned: Value) -> Result<Value>;
    fn read(&self, prior: Value) -> Result<ReadOutcome<Value>>;
    fn update(&self, planned: Value) -> Result<Value>;
    fn delete(&self, prior: Value) -> Result<()>;
    fn import(&self, id: &str) -> Result<ReadOutcome<Value>>;
}

/// Data source with config and output carried as JSON
pub trait DynDataSource: Send + Sync {
    fn schema(&self) -> Schema;
    fn read(&self, config: Value) -> Result<Value>;
}

/// Adapter from a typed [`Resource`] or [`DataSource`] to its JSON form
pub struct Erased<T>(pub T);

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).with_context(|| format!("{what} does not match the schema"))
}

fn encode<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to encode state")
}

impl<R: Resource> DynResource for Erased<R> {
    fn schema(&self) -> Schema {
        self.0.schema()
    }

    fn create(&self, planned: Value) -> Result<Value> {
        let created = self.0.create(decode(planned, "planned state")?)?;
        encode(&created)
    }

    fn read(&self, prior: Value) -> Result<ReadOutcome<Value>> {
        match self.0.read(decode(prior, "prior state")?)? {
            ReadOutcome::Present(state) => Ok(ReadOutcome::Present(encode(&state)?)),
            ReadOutcome::Removed => Ok(ReadOutcome::Removed),
        }
    }

    fn update(&self, planned: Value) -> Result<Value> {
        let updated = self.0.update(decode(planned, "planned state")?)?;
        encode(&updated)
    }

    fn delete(&self, prior: Value) -> Result<()> {
        self.0.delete(decode(prior, "prior state")?)
    }

    fn import(&self, id: &str) -> Result<ReadOutcome<Value>> {
        match self.0.import(id)? {
            ReadOutcome::Present(state) => Ok(ReadOutcome::Present(encode(&state)?)),
            ReadOutcome::Removed => Ok(ReadOutcome::Removed),
        }
    }
}

impl<D: DataSource> DynDataSource for Erased<D> {
    fn schema(&self) -> Schema {
        self.0.schema()
    }

    fn read(&self, config: Value) -> Result<Value> {
        let output = self.0.read(decode(config, "config")?)?;
        encode(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use serde::Deserialize;
    use serde_json::json;

    struct Echo;

    #[derive(Serialize, Deserialize)]
    struct EchoState {
        name: String,
        #[serde(default)]
        id: Option<String>,
    }

    impl Resource for Echo {
        type State = EchoState;

        fn schema(&self) -> Schema {
            Schema::new()
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("name", Attribute::required_string())
        }

        fn create(&self, planned: EchoState) -> Result<EchoState> {
            Ok(EchoState {
                id: Some(format!("echo-{}", planned.name)),
                ..planned
            })
        }

        fn read(&self, prior: EchoState) -> Result<ReadOutcome<EchoState>> {
            if prior.name == "gone" {
                return Ok(ReadOutcome::Removed);
            }
            Ok(ReadOutcome::Present(prior))
        }

        fn update(&self, planned: EchoState) -> Result<EchoState> {
            Ok(planned)
        }

        fn delete(&self, _prior: EchoState) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_erased_create() {
        let erased = Erased(Echo);
        let created = DynResource::create(&erased, json!({"name": "a"})).unwrap();
        assert_eq!(created["id"], "echo-a");
    }

    #[test]
    fn test_erased_read_removed() {
        let erased = Erased(Echo);
        let outcome = DynResource::read(&erased, json!({"name": "gone"})).unwrap();
        assert!(outcome.is_removed());
    }

    #[test]
    fn test_erased_rejects_bad_state() {
        let erased = Erased(Echo);
        let err = DynResource::create(&erased, json!({"nom": "a"})).unwrap_err();
        assert!(err.to_string().contains("planned state"));
    }

    #[test]
    fn test_import_unsupported_by_default() {
        let erased = Erased(Echo);
        let err = DynResource::import(&erased, "x").unwrap_err();
        assert!(err.to_string().contains("does not support import"));
    }
}
