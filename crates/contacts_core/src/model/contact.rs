//! Contact domain model.
//!
//! # Responsibility
//! - Define the canonical stored record and the create/update input shapes.
//! - Enforce field rules on any fully-built contact.
//!
//! # Invariants
//! - `id` is server-assigned, non-nil and never changes after creation.
//! - All four business fields satisfy `FIELD_RULES` on every stored row.

use crate::model::validation::{ContactField, FieldError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a contact.
pub type ContactId = Uuid;

/// Canonical contact record.
///
/// Field order is the wire encoding order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
}

/// Fully-specified business fields for a new contact (create input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub first_name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
}

/// Subset of business fields supplied by an update.
///
/// `None` means "leave the stored value untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Validation error for a fully-built contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    NilId,
    InvalidFields(Vec<FieldError>),
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "contact id must not be nil"),
            Self::InvalidFields(errors) => {
                write!(f, "invalid contact fields:")?;
                for error in errors {
                    write!(f, " [{error}]")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for ContactValidationError {}

impl Contact {
    /// Builds a contact from create input with a freshly generated id.
    pub fn new(fields: NewContact) -> Self {
        Self::from_parts(Uuid::new_v4(), fields)
    }

    /// Builds a contact with a caller-provided id.
    ///
    /// Used by id-injection paths (tests, imports). Rejects the nil UUID.
    pub fn with_id(id: ContactId, fields: NewContact) -> Result<Self, ContactValidationError> {
        if id.is_nil() {
            return Err(ContactValidationError::NilId);
        }
        Ok(Self::from_parts(id, fields))
    }

    fn from_parts(id: ContactId, fields: NewContact) -> Self {
        Self {
            id,
            first_name: fields.first_name,
            surname: fields.surname,
            username: fields.username,
            email: fields.email,
        }
    }

    /// Returns the current value of one business field.
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::Surname => &self.surname,
            ContactField::Username => &self.username,
            ContactField::Email => &self.email,
        }
    }

    /// Checks id and every business field against its rule.
    ///
    /// Reports all failing fields, not just the first.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.id.is_nil() {
            return Err(ContactValidationError::NilId);
        }

        let errors: Vec<FieldError> = ContactField::ALL
            .iter()
            .filter_map(|field| field.rule().check(self.field(*field)).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ContactValidationError::InvalidFields(errors))
        }
    }

    /// Applies every present patch value, in `ContactField::ALL` order.
    ///
    /// The id is never touched.
    pub fn apply(&mut self, patch: ContactPatch) {
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(surname) = patch.surname {
            self.surname = surname;
        }
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }
}

impl ContactPatch {
    /// Returns true when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.surname.is_none()
            && self.username.is_none()
            && self.email.is_none()
    }

    pub(crate) fn set(&mut self, field: ContactField, value: String) {
        match field {
            ContactField::FirstName => self.first_name = Some(value),
            ContactField::Surname => self.surname = Some(value),
            ContactField::Username => self.username = Some(value),
            ContactField::Email => self.email = Some(value),
        }
    }
}
