//! Wire schema for contacts.
//!
//! # Responsibility
//! - Decode JSON bodies into `NewContact` (full mode) or `ContactPatch`
//!   (partial mode) by walking the declarative `FIELD_RULES` table.
//! - Define the list envelope used when encoding many contacts.
//!
//! # Invariants
//! - `id` is output-only; supplying it is a field error in both modes.
//! - Every present field is checked; all failures are reported together.
//! - Decoding never touches storage.

use crate::model::contact::{Contact, ContactPatch, NewContact};
use crate::model::validation::{FieldError, FIELD_RULES};
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ID_FIELD: &str = "id";

/// Decode mode selecting the required-field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// All business fields required (create).
    Full,
    /// Any subset of business fields (update).
    Partial,
}

/// Schema-level decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Body is valid JSON but not an object.
    NotAnObject,
    /// One or more fields failed their rules.
    InvalidFields(Vec<FieldError>),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "request body must be a JSON object"),
            Self::InvalidFields(errors) => {
                let joined = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "invalid fields: {joined}")
            }
        }
    }
}

impl Error for SchemaError {}

/// Envelope for list responses: `{ "contacts": [...] }`.
#[derive(Debug, Serialize)]
pub struct ContactList<'a> {
    pub contacts: &'a [Contact],
}

/// Decodes a create payload. All four business fields must be present.
pub fn decode_full(body: &Value) -> Result<NewContact, SchemaError> {
    let patch = decode_fields(body, DecodeMode::Full)?;
    match (patch.first_name, patch.surname, patch.username, patch.email) {
        (Some(first_name), Some(surname), Some(username), Some(email)) => Ok(NewContact {
            first_name,
            surname,
            username,
            email,
        }),
        // decode_fields already reports every missing required field.
        _ => Err(SchemaError::InvalidFields(Vec::new())),
    }
}

/// Decodes an update payload. Absent fields stay `None`.
pub fn decode_partial(body: &Value) -> Result<ContactPatch, SchemaError> {
    decode_fields(body, DecodeMode::Partial)
}

/// Generic validate-and-build step shared by both modes.
pub fn decode_fields(body: &Value, mode: DecodeMode) -> Result<ContactPatch, SchemaError> {
    let object: &Map<String, Value> = body.as_object().ok_or(SchemaError::NotAnObject)?;

    let mut errors = Vec::new();
    let mut patch = ContactPatch::default();

    if object.contains_key(ID_FIELD) {
        errors.push(FieldError::new(
            ID_FIELD,
            "The id is assigned by the server and cannot be supplied.",
        ));
    }

    for rule in FIELD_RULES.iter() {
        let name = rule.field.as_str();
        match object.get(name) {
            None => {
                if mode == DecodeMode::Full && rule.required {
                    errors.push(FieldError::new(name, "Missing data for required field."));
                }
            }
            Some(Value::Null) => errors.push(FieldError::new(name, "Field may not be null.")),
            Some(Value::String(value)) => match rule.check(value) {
                Ok(()) => patch.set(rule.field, value.clone()),
                Err(error) => errors.push(error),
            },
            Some(_) => errors.push(FieldError::new(name, "Not a valid string.")),
        }
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(SchemaError::InvalidFields(errors))
    }
}
