//! Case-insensitive uniqueness checks over the contact store.
//!
//! # Invariants
//! - Checks are read-only and take no locks; the store's own unique
//!   constraints close the check-then-write race.
//! - Store failures propagate; a failed lookup is never reported as "free".

use crate::model::contact::Contact;
use crate::repo::contact_repo::{ContactFilter, ContactRepository, RepoResult};

/// Fields that must be unique across the contact collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }

    /// Current stored value of this field on `contact`.
    pub fn value_of(self, contact: &Contact) -> &str {
        match self {
            Self::Username => &contact.username,
            Self::Email => &contact.email,
        }
    }

    fn filter(self, value: &str) -> ContactFilter<'_> {
        match self {
            Self::Username => ContactFilter::UsernameIgnoreCase(value),
            Self::Email => ContactFilter::EmailIgnoreCase(value),
        }
    }
}

/// Returns the contact already holding `value` for `field`, ignoring case.
pub fn find_holder<R: ContactRepository + ?Sized>(
    repo: &R,
    field: UniqueField,
    value: &str,
) -> RepoResult<Option<Contact>> {
    repo.find_contact(field.filter(value))
}

/// True if a stored contact already uses `username`, ignoring case.
pub fn contact_username_exists<R: ContactRepository + ?Sized>(
    repo: &R,
    username: &str,
) -> RepoResult<bool> {
    Ok(find_holder(repo, UniqueField::Username, username)?.is_some())
}

/// True if a stored contact already uses `email`, ignoring case.
pub fn contact_email_exists<R: ContactRepository + ?Sized>(
    repo: &R,
    email: &str,
) -> RepoResult<bool> {
    Ok(find_holder(repo, UniqueField::Email, email)?.is_some())
}
