//! # persondb
//!
//! Client for the persons record store.
//!
//! The store holds person records keyed by a caller-chosen `person_id`,
//! each with a mandatory last name and an optional first name. This crate
//! provides:
//! - A [`Store`](backend::Store) capability with exists/create/read/update/delete
//! - A SQLite backend for on-disk databases
//! - An in-memory backend for tests
//! - A high-level [`Client`] wrapping whichever backend is in use
//!
//! ## Example
//!
//! ```no_run
//! use persondb::Client;
//! use std::path::Path;
//!
//! let client = Client::open(Path::new("/tmp/persons.db"))?;
//!
//! if !client.exists("alice")? {
//!     client.create_person("alice", "Liddell", Some("Alice"))?;
//! }
//!
//! if let Some(person) = client.read_person("alice")? {
//!     println!("{} {}", person.first_name_or_empty(), person.last_name);
//! }
//! # Ok::<(), persondb::Error>(())
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use types::{Person, normalize_name};

use backend::{Store, memory::MemoryStore, sqlite::SqliteStore};
use std::path::Path;

/// High-level client for the persons store.
///
/// The client wraps a backend and is the handle the provider creates once
/// and shares with every resource and data source.
pub struct Client {
    store: Box<dyn Store>,
}

impl Client {
    /// Open the SQLite database at `path`, creating it if needed.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::with_store(Box::new(SqliteStore::open(path)?)))
    }

    /// Create a client over an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    /// Create a client with a custom backend (useful for testing).
    pub fn with_store(store: Box<dyn Store>) -> Self {
        Self { store }
    }

    /// Check whether a person exists.
    pub fn exists(&self, person_id: &str) -> Result<bool> {
        self.store.exists(person_id)
    }

    /// Create a person.
    pub fn create_person(
        &self,
        person_id: &str,
        last_name: &str,
        first_name: Option<&str>,
    ) -> Result<()> {
        self.store
            .create(&Person::new(person_id, last_name, first_name))
    }

    /// Read a person; `Ok(None)` when the record does not exist.
    pub fn read_person(&self, person_id: &str) -> Result<Option<Person>> {
        self.store.read(person_id)
    }

    /// Overwrite a person's names.
    pub fn update_person(
        &self,
        person_id: &str,
        last_name: &str,
        first_name: Option<&str>,
    ) -> Result<()> {
        self.store
            .update(&Person::new(person_id, last_name, first_name))
    }

    /// Delete a person.
    pub fn delete_person(&self, person_id: &str) -> Result<()> {
        self.store.delete(person_id)
    }

    /// List every person ordered by key.
    pub fn list_persons(&self) -> Result<Vec<Person>> {
        self.store.list()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_client_over_sqlite() {
        let tmp = TempDir::new().unwrap();
        let client = Client::open(&tmp.path().join("persons.db")).unwrap();

        client.create_person("p1", "Doe", Some("Jane")).unwrap();
        assert!(client.exists("p1").unwrap());

        client.update_person("p1", "Doe", Some("")).unwrap();
        let person = client.read_person("p1").unwrap().unwrap();
        assert_eq!(person.first_name, None);

        client.delete_person("p1").unwrap();
        assert!(client.read_person("p1").unwrap().is_none());
    }

    #[test]
    fn test_client_in_memory() {
        let client = Client::in_memory();
        client.create_person("b", "B", None).unwrap();
        client.create_person("a", "A", None).unwrap();

        let persons = client.list_persons().unwrap();
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0].person_id, "a");
    }
}
