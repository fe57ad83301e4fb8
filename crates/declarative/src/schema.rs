//! Attribute schemas for resources and data sources
//!
//! A schema names every attribute a type understands, whether the user
//! supplies it or the provider computes it, and whether changing it forces
//! the resource to be replaced instead of updated in place.

use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Who supplies an attribute's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeMode {
    /// Must be set in config
    Required,
    /// May be set in config
    Optional,
    /// Set by the provider, never by config
    Computed,
}

/// Shape of an attribute's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    StringList,
}

/// One attribute of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub mode: AttributeMode,
    pub value_type: ValueType,
    /// Changing this attribute replaces the resource
    pub requires_replace: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Attribute {
    fn new(mode: AttributeMode, value_type: ValueType) -> Self {
        Self {
            mode,
            value_type,
            requires_replace: false,
            description: String::new(),
        }
    }

    pub fn required_string() -> Self {
        Self::new(AttributeMode::Required, ValueType::String)
    }

    pub fn optional_string() -> Self {
        Self::new(AttributeMode::Optional, ValueType::String)
    }

    pub fn computed_string() -> Self {
        Self::new(AttributeMode::Computed, ValueType::String)
    }

    pub fn computed_string_list() -> Self {
        Self::new(AttributeMode::Computed, ValueType::StringList)
    }

    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether config may set this attribute
    pub fn is_configurable(&self) -> bool {
        self.mode != AttributeMode::Computed
    }

    /// Value used for comparisons: an empty optional string counts as unset
    pub fn normalize(&self, value: Option<&Value>) -> Value {
        match value {
            None | Some(Value::Null) => Value::Null,
            Some(Value::String(s)) if s.is_empty() && self.mode == AttributeMode::Optional => {
                Value::Null
            }
            Some(other) => other.clone(),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self.value_type {
            ValueType::String => value.is_string(),
            ValueType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

/// Schema for one resource or data source type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Attributes config may set, in name order
    pub fn configurable(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.is_configurable())
            .map(|(name, attr)| (name.as_str(), attr))
    }

    /// Collect every problem with a config block
    pub fn diagnostics(&self, config: &Value) -> Vec<String> {
        let Some(object) = config.as_object() else {
            return vec!["config must be a table of attributes".to_string()];
        };

        let mut problems = Vec::new();

        for (name, value) in object {
            match self.attributes.get(name) {
                None => problems.push(format!("unknown attribute {name:?}")),
                Some(attr) if !attr.is_configurable() => {
                    problems.push(format!("attribute {name:?} is computed and cannot be set"));
                }
                Some(attr) if !value.is_null() && !attr.accepts(value) => {
                    problems.push(format!("attribute {name:?} has the wrong type"));
                }
                Some(_) => {}
            }
        }

        for (name, attr) in &self.attributes {
            if attr.mode != AttributeMode::Required {
                continue;
            }
            let missing = match object.get(name) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            };
            if missing {
                problems.push(format!("required attribute {name:?} is missing"));
            }
        }

        problems
    }

    /// Fail with every diagnostic joined, or succeed when there are none
    pub fn validate_config(&self, config: &Value) -> Result<()> {
        let problems = self.diagnostics(config);
        if problems.is_empty() {
            return Ok(());
        }
        bail!("{}", problems.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> Schema {
        Schema::new()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("person_id", Attribute::required_string().requires_replace())
            .with_attribute("last_name", Attribute::required_string())
            .with_attribute("first_name", Attribute::optional_string())
    }

    #[test]
    fn test_valid_config() {
        let schema = person_schema();
        let config = json!({"person_id": "p1", "last_name": "Doe"});
        assert!(schema.validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_required() {
        let schema = person_schema();
        let problems = schema.diagnostics(&json!({"person_id": "p1", "last_name": ""}));
        assert_eq!(problems, vec![r#"required attribute "last_name" is missing"#]);
    }

    #[test]
    fn test_computed_and_unknown_rejected() {
        let schema = person_schema();
        let config = json!({
            "id": "/person/p1",
            "person_id": "p1",
            "last_name": "Doe",
            "nickname": "JD",
        });
        let problems = schema.diagnostics(&config);
        assert_eq!(problems.len(), 2);

        let err = schema.validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("computed"));
    }

    #[test]
    fn test_wrong_type() {
        let schema = person_schema();
        let problems = schema.diagnostics(&json!({"person_id": 7, "last_name": "Doe"}));
        assert_eq!(problems, vec![r#"attribute "person_id" has the wrong type"#]);
    }

    #[test]
    fn test_normalize_empty_optional() {
        let schema = person_schema();
        let first = schema.attribute("first_name").unwrap();
        assert_eq!(first.normalize(Some(&json!(""))), Value::Null);
        assert_eq!(first.normalize(None), Value::Null);
        assert_eq!(first.normalize(Some(&json!("Jane"))), json!("Jane"));

        let last = schema.attribute("last_name").unwrap();
        assert_eq!(last.normalize(Some(&json!(""))), json!(""));
    }
}
