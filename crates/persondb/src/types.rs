//! Data types for the persons store

use serde::{Deserialize, Serialize};

/// A person record as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Caller-chosen key, unique within the store
    pub person_id: String,
    /// Mandatory last name
    pub last_name: String,
    /// Optional first name; the store keeps an unset name as empty
    #[serde(default)]
    pub first_name: Option<String>,
}

impl Person {
    /// Create a new person record.
    ///
    /// An empty first name is normalized to `None`.
    pub fn new(
        person_id: impl Into<String>,
        last_name: impl Into<String>,
        first_name: Option<&str>,
    ) -> Self {
        Self {
            person_id: person_id.into(),
            last_name: last_name.into(),
            first_name: normalize_name(first_name),
        }
    }

    /// First name as stored, empty when unset
    pub fn first_name_or_empty(&self) -> &str {
        self.first_name.as_deref().unwrap_or("")
    }

    /// Reject records the store would refuse
    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.person_id.is_empty() {
            return Err(crate::Error::Invalid("person_id must not be empty".into()));
        }
        if self.person_id.contains('/') {
            return Err(crate::Error::Invalid(format!(
                "person_id must not contain '/': {}",
                self.person_id
            )));
        }
        if self.last_name.is_empty() {
            return Err(crate::Error::Invalid(format!(
                "last_name must not be empty for {}",
                self.person_id
            )));
        }
        Ok(())
    }
}

/// Treat an empty name the same as an unset one
pub fn normalize_name(name: Option<&str>) -> Option<String> {
    name.filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_empty_first_name() {
        let person = Person::new("p1", "Doe", Some(""));
        assert_eq!(person.first_name, None);
        assert_eq!(person.first_name_or_empty(), "");

        let person = Person::new("p1", "Doe", Some("Jane"));
        assert_eq!(person.first_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_validate() {
        assert!(Person::new("p1", "Doe", None).validate().is_ok());
        assert!(Person::new("", "Doe", None).validate().is_err());
        assert!(Person::new("a/b", "Doe", None).validate().is_err());
        assert!(Person::new("p1", "", None).validate().is_err());
    }
}
