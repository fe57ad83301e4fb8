//! In-memory store, for tests and throwaway runs.

use super::Store;
use crate::error::{Error, Result};
use crate::types::Person;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// A store that keeps records in a map
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, Person>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, BTreeMap<String, Person>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Store for MemoryStore {
    fn exists(&self, person_id: &str) -> Result<bool> {
        Ok(self.records().contains_key(person_id))
    }

    fn create(&self, person: &Person) -> Result<()> {
        person.validate()?;

        let mut records = self.records();
        if records.contains_key(&person.person_id) {
            return Err(Error::AlreadyExists {
                person_id: person.person_id.clone(),
            });
        }
        records.insert(person.person_id.clone(), person.clone());
        Ok(())
    }

    fn read(&self, person_id: &str) -> Result<Option<Person>> {
        Ok(self.records().get(person_id).cloned())
    }

    fn update(&self, person: &Person) -> Result<()> {
        person.validate()?;

        match self.records().get_mut(&person.person_id) {
            Some(existing) => {
                *existing = person.clone();
                Ok(())
            }
            None => Err(Error::NotFound {
                person_id: person.person_id.clone(),
            }),
        }
    }

    fn delete(&self, person_id: &str) -> Result<()> {
        match self.records().remove(person_id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound {
                person_id: person_id.to_string(),
            }),
        }
    }

    fn list(&self) -> Result<Vec<Person>> {
        Ok(self.records().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crud_cycle() {
        let store = MemoryStore::new();
        store.create(&Person::new("p1", "Doe", None)).unwrap();
        assert!(store.exists("p1").unwrap());

        store
            .update(&Person::new("p1", "Doe", Some("Jane")))
            .unwrap();
        assert_eq!(
            store.read("p1").unwrap().unwrap().first_name.as_deref(),
            Some("Jane")
        );

        store.delete("p1").unwrap();
        assert!(store.read("p1").unwrap().is_none());
    }

    #[test]
    fn test_rejects_invalid_records() {
        let store = MemoryStore::new();
        let err = store.create(&Person::new("p1", "", None)).unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }
}
