//! Recorded state of managed resources

use crate::address::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One managed resource as last recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInstance {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: Value,
}

/// Every managed resource, keyed by address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceInstance>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Address) -> Option<&Value> {
        self.resources
            .get(&address.to_string())
            .map(|instance| &instance.attributes)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.resources.contains_key(&address.to_string())
    }

    pub fn insert(&mut self, address: &Address, attributes: Value) {
        self.resources.insert(
            address.to_string(),
            ResourceInstance {
                resource_type: address.resource_type.clone(),
                attributes,
            },
        );
    }

    pub fn remove(&mut self, address: &Address) -> Option<Value> {
        self.resources
            .remove(&address.to_string())
            .map(|instance| instance.attributes)
    }

    /// Addresses in state, in order
    ///
    /// Keys that do not parse as addresses are skipped with a warning.
    pub fn addresses(&self) -> Vec<Address> {
        self.resources
            .keys()
            .filter_map(|key| match key.parse() {
                Ok(address) => Some(address),
                Err(e) => {
                    log::warn!("Ignoring state entry {key}: {e}");
                    None
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_get_remove() {
        let mut state = State::new();
        let addr = Address::new("persondb_person", "alice");

        state.insert(&addr, json!({"person_id": "alice"}));
        assert!(state.contains(&addr));
        assert_eq!(state.get(&addr).unwrap()["person_id"], "alice");
        assert_eq!(state.resources["persondb_person.alice"].resource_type, "persondb_person");

        assert!(state.remove(&addr).is_some());
        assert!(state.is_empty());
    }

    #[test]
    fn test_addresses_skip_garbage() {
        let mut state = State::new();
        state.insert(&Address::new("t", "b"), json!({}));
        state.insert(&Address::new("t", "a"), json!({}));
        state.resources.insert(
            "garbage".into(),
            ResourceInstance {
                resource_type: "t".into(),
                attributes: json!({}),
            },
        );

        let names: Vec<_> = state.addresses().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_serde_shape() {
        let mut state = State::new();
        state.insert(&Address::new("t", "a"), json!({"k": "v"}));

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["resources"]["t.a"]["type"], "t");
        assert_eq!(json["resources"]["t.a"]["attributes"]["k"], "v");

        let back: State = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
