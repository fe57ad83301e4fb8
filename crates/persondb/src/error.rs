//! Error types for the persons store.
//!
//! Errors are categorized so callers can tell a record that is genuinely
//! absent apart from a store that could not answer.

use std::path::PathBuf;
use thiserror::Error;

/// Categories of store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The record does not exist
    NotFound,
    /// A record with the same key already exists
    AlreadyExists,
    /// The caller supplied an invalid record
    Invalid,
    /// The store itself failed (I/O, SQL, lock)
    Unavailable,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Person not found",
            Self::AlreadyExists => "Person already exists",
            Self::Invalid => "Invalid person record",
            Self::Unavailable => "Persons store unavailable",
        }
    }
}

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database file's parent directory could not be prepared
    #[error("cannot open database {}: {source}", .path.display())]
    Open {
        /// Path of the database file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// No record with this key
    #[error("person not found: {person_id}")]
    NotFound {
        /// Key that was looked up
        person_id: String,
    },

    /// A record with this key already exists
    #[error("person already exists: {person_id}")]
    AlreadyExists {
        /// Key that is already taken
        person_id: String,
    },

    /// Record failed validation before reaching the store
    #[error("invalid person: {0}")]
    Invalid(String),

    /// Backend-specific failure that fits no other variant
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::AlreadyExists { .. } => ErrorCategory::AlreadyExists,
            Error::Invalid(_) => ErrorCategory::Invalid,
            _ => ErrorCategory::Unavailable,
        }
    }

    /// Whether this error means the record is absent.
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_not_found() {
        let err = Error::NotFound {
            person_id: "alice".into(),
        };
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "person not found: alice");
    }

    #[test]
    fn test_category_unavailable() {
        let err = Error::Other("disk on fire".into());
        assert_eq!(err.category(), ErrorCategory::Unavailable);
        assert!(!err.is_not_found());

        let err = Error::Open {
            path: PathBuf::from("/nope/persons.db"),
            source: std::io::Error::other("read-only file system"),
        };
        assert_eq!(err.category(), ErrorCategory::Unavailable);
    }

    #[test]
    fn test_category_already_exists() {
        let err = Error::AlreadyExists {
            person_id: "bob".into(),
        };
        assert_eq!(err.category(), ErrorCategory::AlreadyExists);
        assert_eq!(err.category().description(), "Person already exists");
    }
}
