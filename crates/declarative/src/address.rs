//! Resource addresses: `<type>.<name>`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing an address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must be <type>.<name>, got: {0:?}")]
    MissingSeparator(String),
    #[error("address has an empty type or name: {0:?}")]
    EmptyPart(String),
    #[error("resource name must not contain '.': {0:?}")]
    DottedName(String),
}

/// Identifies one resource instance in config and state
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address {
    pub resource_type: String,
    pub name: String,
}

impl Address {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Check whether this address is selected by a `--target` filter
    ///
    /// A target is either a bare type (`persondb_person`) selecting every
    /// instance of that type, or a full address.
    pub fn matches_target(&self, target: Option<&str>) -> bool {
        let Some(target) = target else {
            return true;
        };
        match target.split_once('.') {
            Some((resource_type, name)) => {
                self.resource_type == resource_type && self.name == name
            }
            None => self.resource_type == target,
        }
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource_type, name) = s
            .split_once('.')
            .ok_or_else(|| AddressError::MissingSeparator(s.to_string()))?;
        if resource_type.is_empty() || name.is_empty() {
            return Err(AddressError::EmptyPart(s.to_string()));
        }
        if name.contains('.') {
            return Err(AddressError::DottedName(s.to_string()));
        }
        Ok(Self::new(resource_type, name))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}
