//! `persondb_person`: a person record managed through its full lifecycle
//!
//! The store is the only authority on whether a person exists. The resource
//! keeps no state of its own; every operation works from the state handed
//! to it and reports back what the store now holds.

use crate::identity::{self, MalformedIdentityError};
use anyhow::Result;
use declarative::{Attribute, ReadOutcome, Resource, Schema};
use persondb::{Client, normalize_name};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Recorded attributes of a managed person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonState {
    /// `/person/<person_id>`, set once a create succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub person_id: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl PersonState {
    fn with_identity(mut self) -> Self {
        self.id = Some(identity::encode(&self.person_id));
        self.first_name = normalize_name(self.first_name.as_deref());
        self
    }
}

/// Failures of person lifecycle operations
#[derive(Debug, Error)]
pub enum PersonError {
    #[error("persons store unavailable while handling {person_id}")]
    StoreUnavailable {
        person_id: String,
        #[source]
        source: persondb::Error,
    },

    #[error(
        "person {person_id} already exists in the database; \
         import it with: persondb-provider import <address> /person/{person_id}"
    )]
    AlreadyExists { person_id: String },

    #[error("could not create person {person_id}")]
    CreateFailed {
        person_id: String,
        #[source]
        source: persondb::Error,
    },

    #[error("could not update person {person_id}")]
    UpdateFailed {
        person_id: String,
        #[source]
        source: persondb::Error,
    },

    #[error("could not delete person {person_id}")]
    DeleteFailed {
        person_id: String,
        #[source]
        source: persondb::Error,
    },

    #[error(transparent)]
    MalformedIdentity(#[from] MalformedIdentityError),
}

/// Attributes of `persondb_person`
pub fn schema() -> Schema {
    Schema::new()
        .with_description("A person record in the persons database")
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("Identity, /person/<person_id>"),
        )
        .with_attribute(
            "person_id",
            Attribute::required_string()
                .requires_replace()
                .with_description("Unique key of the person"),
        )
        .with_attribute(
            "last_name",
            Attribute::required_string().with_description("Last name"),
        )
        .with_attribute(
            "first_name",
            Attribute::optional_string().with_description("First name; empty means unset"),
        )
}

/// How much of the state a refresh may overwrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    /// Keep a known first name when the store reports none
    Full,
    /// Take every field from the store; used when importing
    IdentityOnly,
}

/// Lifecycle controller for person records
pub struct PersonResource {
    client: Arc<Client>,
}

impl PersonResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Create the person unless the key is already taken
    pub fn create_person(&self, planned: PersonState) -> Result<PersonState, PersonError> {
        let person_id = planned.person_id.clone();
        log::debug!("Creating person {person_id}");

        let exists = self
            .client
            .exists(&person_id)
            .map_err(|source| PersonError::StoreUnavailable {
                person_id: person_id.clone(),
                source,
            })?;
        if exists {
            return Err(PersonError::AlreadyExists { person_id });
        }

        self.client
            .create_person(
                &person_id,
                &planned.last_name,
                planned.first_name.as_deref(),
            )
            .map_err(|source| PersonError::CreateFailed {
                person_id: person_id.clone(),
                source,
            })?;

        log::trace!("Created person {person_id}");
        Ok(planned.with_identity())
    }

    /// Reconcile recorded state with the store
    pub fn read_person(
        &self,
        prior: PersonState,
    ) -> Result<ReadOutcome<PersonState>, PersonError> {
        self.refresh(prior, Refresh::Full)
    }

    /// Overwrite the person's names; no existence check is made first
    pub fn update_person(&self, planned: PersonState) -> Result<PersonState, PersonError> {
        log::debug!("Updating person {}", planned.person_id);

        self.client
            .update_person(
                &planned.person_id,
                &planned.last_name,
                planned.first_name.as_deref(),
            )
            .map_err(|source| PersonError::UpdateFailed {
                person_id: planned.person_id.clone(),
                source,
            })?;

        log::trace!("Updated person {}", planned.person_id);
        Ok(planned.with_identity())
    }

    pub fn delete_person(&self, prior: PersonState) -> Result<(), PersonError> {
        log::debug!("Deleting person {}", prior.person_id);

        self.client
            .delete_person(&prior.person_id)
            .map_err(|source| PersonError::DeleteFailed {
                person_id: prior.person_id.clone(),
                source,
            })?;

        log::trace!("Deleted person {}", prior.person_id);
        Ok(())
    }

    /// Adopt an existing person by identity
    pub fn import_person(&self, id: &str) -> Result<ReadOutcome<PersonState>, PersonError> {
        let person_id = identity::decode(id)?;
        log::debug!("Importing person {person_id}");

        let seed = PersonState {
            id: Some(id.to_string()),
            person_id,
            last_name: String::new(),
            first_name: None,
        };
        self.refresh(seed, Refresh::IdentityOnly)
    }

    fn refresh(
        &self,
        mut state: PersonState,
        mode: Refresh,
    ) -> Result<ReadOutcome<PersonState>, PersonError> {
        log::debug!("Reading person {} ({mode:?})", state.person_id);

        let person = match self.client.read_person(&state.person_id) {
            Ok(Some(person)) => person,
            Ok(None) => return Ok(self.vanished(&state.person_id)),
            Err(e) if e.is_not_found() => return Ok(self.vanished(&state.person_id)),
            Err(source) => {
                return Err(PersonError::StoreUnavailable {
                    person_id: state.person_id,
                    source,
                });
            }
        };

        state.last_name = person.last_name;
        match mode {
            Refresh::Full => {
                if person.first_name.is_some() {
                    state.first_name = person.first_name;
                }
            }
            Refresh::IdentityOnly => state.first_name = person.first_name,
        }
        state.id = Some(identity::encode(&state.person_id));

        Ok(ReadOutcome::Present(state))
    }

    fn vanished(&self, person_id: &str) -> ReadOutcome<PersonState> {
        log::warn!("Person {person_id} no longer exists in the database");
        ReadOutcome::Removed
    }
}

impl Resource for PersonResource {
    type State = PersonState;

    fn schema(&self) -> Schema {
        schema()
    }

    fn create(&self, planned: PersonState) -> Result<PersonState> {
        Ok(self.create_person(planned)?)
    }

    fn read(&self, prior: PersonState) -> Result<ReadOutcome<PersonState>> {
        Ok(self.read_person(prior)?)
    }

    fn update(&self, planned: PersonState) -> Result<PersonState> {
        Ok(self.update_person(planned)?)
    }

    fn delete(&self, prior: PersonState) -> Result<()> {
        Ok(self.delete_person(prior)?)
    }

    fn import(&self, id: &str) -> Result<ReadOutcome<PersonState>> {
        Ok(self.import_person(id)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
