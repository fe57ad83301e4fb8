//! Identity strings for managed persons: `/person/<person_id>`

use thiserror::Error;

const KIND: &str = "person";

/// An identity string that is not of the form `/person/<person_id>`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed identity {identity:?}: expected /person/<person_id>")]
pub struct MalformedIdentityError {
    pub identity: String,
}

/// Build the identity for a person key
pub fn encode(person_id: &str) -> String {
    format!("/{KIND}/{person_id}")
}

/// Extract the person key from an identity
///
/// The identity must split on `/` into exactly three segments: an empty
/// one, `person`, and a non-empty key.
pub fn decode(identity: &str) -> Result<String, MalformedIdentityError> {
    let malformed = || MalformedIdentityError {
        identity: identity.to_string(),
    };

    let segments: Vec<&str> = identity.split('/').collect();
    match segments.as_slice() {
        ["", kind, key] if *kind == KIND && !key.is_empty() => Ok((*key).to_string()),
        _ => Err(malformed()),
    }
}
