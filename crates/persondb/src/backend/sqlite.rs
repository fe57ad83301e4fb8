//! SQLite-backed store, one file per database.

use super::Store;
use crate::error::{Error, Result};
use crate::types::Person;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A persons database stored in a single SQLite file
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path
    ///
    /// Creates the database file and the `persons` table if they don't exist.
    pub fn open(db_path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| Error::Open {
                path: db_path.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory SQLite database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS persons (
                person_id TEXT PRIMARY KEY NOT NULL,
                last_name TEXT NOT NULL,
                first_name TEXT NOT NULL DEFAULT ''
            );
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Store for SqliteStore {
    fn exists(&self, person_id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn()
            .query_row(
                "SELECT 1 FROM persons WHERE person_id = ?1",
                [person_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn create(&self, person: &Person) -> Result<()> {
        person.validate()?;

        let result = self.conn().execute(
            "INSERT INTO persons (person_id, last_name, first_name) VALUES (?1, ?2, ?3)",
            params![
                person.person_id,
                person.last_name,
                person.first_name_or_empty()
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists {
                    person_id: person.person_id.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read(&self, person_id: &str) -> Result<Option<Person>> {
        let row = self
            .conn()
            .query_row(
                "SELECT last_name, first_name FROM persons WHERE person_id = ?1",
                [person_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        Ok(row.map(|(last_name, first_name)| {
            Person::new(person_id, last_name, Some(first_name.as_str()))
        }))
    }

    fn update(&self, person: &Person) -> Result<()> {
        person.validate()?;

        let changed = self.conn().execute(
            "UPDATE persons SET last_name = ?2, first_name = ?3 WHERE person_id = ?1",
            params![
                person.person_id,
                person.last_name,
                person.first_name_or_empty()
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound {
                person_id: person.person_id.clone(),
            });
        }
        Ok(())
    }

    fn delete(&self, person_id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM persons WHERE person_id = ?1", [person_id])?;

        if changed == 0 {
            return Err(Error::NotFound {
                person_id: person_id.to_string(),
            });
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<Person>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT person_id, last_name, first_name FROM persons ORDER BY person_id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut persons = Vec::new();
        for row in rows {
            let (person_id, last_name, first_name) = row?;
            persons.push(Person::new(person_id, last_name, Some(first_name.as_str())));
        }
        Ok(persons)
    }
}
