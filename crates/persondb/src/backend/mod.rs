//! Backend abstraction for the persons store.
//!
//! The [`Store`] trait is the capability the rest of the system consumes,
//! allowing for different implementations (SQLite file, in-memory, mocks).

pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::types::Person;

/// Store trait for person records.
///
/// Every method is a single bounded round trip. Implementations do not
/// retry; the caller decides what to do with an error.
pub trait Store: Send + Sync {
    /// Check whether a record exists.
    fn exists(&self, person_id: &str) -> Result<bool>;

    /// Create a record.
    ///
    /// Fails with [`crate::Error::AlreadyExists`] if the key is taken.
    fn create(&self, person: &Person) -> Result<()>;

    /// Read a record.
    ///
    /// `Ok(None)` means the record does not exist. An `Err` means the
    /// store could not answer.
    fn read(&self, person_id: &str) -> Result<Option<Person>>;

    /// Overwrite the names of an existing record.
    ///
    /// Fails with [`crate::Error::NotFound`] if the key is absent.
    fn update(&self, person: &Person) -> Result<()>;

    /// Delete a record.
    ///
    /// Fails with [`crate::Error::NotFound`] if the key is absent.
    fn delete(&self, person_id: &str) -> Result<()>;

    /// List all records ordered by key.
    fn list(&self) -> Result<Vec<Person>>;
}
