//! `persondb_person` data source: look up one person by key

use crate::identity;
use anyhow::{Context, Result, bail};
use declarative::{Attribute, DataSource, Schema};
use persondb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct PersonLookup {
    pub person_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRecord {
    pub id: String,
    pub person_id: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

pub struct PersonDataSource {
    client: Arc<Client>,
}

impl PersonDataSource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl DataSource for PersonDataSource {
    type Config = PersonLookup;
    type Output = PersonRecord;

    fn schema(&self) -> Schema {
        Schema::new()
            .with_description("Look up a person by key")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("person_id", Attribute::required_string())
            .with_attribute("last_name", Attribute::computed_string())
            .with_attribute("first_name", Attribute::computed_string())
    }

    fn read(&self, config: PersonLookup) -> Result<PersonRecord> {
        log::debug!("Looking up person {}", config.person_id);

        let person = self
            .client
            .read_person(&config.person_id)
            .with_context(|| format!("Could not read person {}", config.person_id))?;

        let Some(person) = person else {
            bail!("Person {} not found in the database", config.person_id);
        };

        Ok(PersonRecord {
            id: identity::encode(&person.person_id),
            person_id: person.person_id,
            last_name: person.last_name,
            first_name: person.first_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let client = Arc::new(Client::in_memory());
        client.create_person("p1", "Doe", Some("Jane")).unwrap();
        let source = PersonDataSource::new(client);

        let record = source
            .read(PersonLookup {
                person_id: "p1".into(),
            })
            .unwrap();

        assert_eq!(record.id, "/person/p1");
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_lookup_omits_empty_first_name() {
        let client = Arc::new(Client::in_memory());
        client.create_person("p1", "Doe", None).unwrap();
        let source = PersonDataSource::new(client);

        let record = source
            .read(PersonLookup {
                person_id: "p1".into(),
            })
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("first_name").is_none());
    }

    #[test]
    fn test_lookup_missing() {
        let source = PersonDataSource::new(Arc::new(Client::in_memory()));
        let err = source
            .read(PersonLookup {
                person_id: "ghost".into(),
            })
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
