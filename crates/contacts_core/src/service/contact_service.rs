//! Contact use-case service.
//!
//! # Responsibility
//! - Implement create/list/get/delete/update over a `ContactRepository`.
//! - Turn uniqueness and existence failures into client-facing errors.
//!
//! # Invariants
//! - A conflict or not-found outcome performs zero repository writes.
//! - Update looks the target up before running any uniqueness check.
//! - Update applies fields in the order first_name, surname, username, email.
//! - The service never assigns or changes an id outside `create_contact`.

use crate::model::contact::{Contact, ContactId, ContactPatch, NewContact};
use crate::repo::contact_repo::{ContactFilter, ContactRepository, RepoError};
use crate::service::uniqueness::{
    contact_email_exists, contact_username_exists, find_holder, UniqueField,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Which value an update's uniqueness check inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateUniqueness {
    /// Check the incoming value against every other contact.
    #[default]
    Candidate,
    /// Legacy behavior: check the target's current stored value.
    ///
    /// Because the target itself holds that value, any update that supplies
    /// `username` (or `email`) is reported as a conflict against a real store.
    Stored,
}

/// Service error for contact use-cases.
#[derive(Debug)]
pub enum ContactServiceError {
    /// Create input collides with an existing username/email.
    DuplicateOnCreate { field: UniqueField, value: String },
    /// Update input collides with an existing username/email.
    DuplicateOnUpdate { field: UniqueField, value: String },
    /// Lookup by username found nothing.
    UsernameNotFound(String),
    /// Delete target does not exist.
    DeleteTargetNotFound(ContactId),
    /// Update target does not exist.
    UpdateTargetNotFound(ContactId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ContactServiceError {
    /// True for outcomes caused by the caller's input rather than the store.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateOnCreate { field, value } => write!(
                f,
                "Sorry, the {} {value} of the contact you try to add already exists",
                field.as_str()
            ),
            Self::DuplicateOnUpdate { field, value } => write!(
                f,
                "Sorry, you cannot update the contact with the {} {value}: it already exists",
                field.as_str()
            ),
            Self::UsernameNotFound(username) => {
                write!(f, "Sorry, there is no contact with the username {username}")
            }
            Self::DeleteTargetNotFound(id) => {
                write!(f, "Sorry, the contact {id} you try to delete does not exist")
            }
            Self::UpdateTargetNotFound(id) => {
                write!(f, "Sorry, the contact {id} you try to update does not exist")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContactServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, ContactServiceError>;

/// Contact service facade over repository implementations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
    id_source: fn() -> ContactId,
    update_uniqueness: UpdateUniqueness,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service generating random v4 ids.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            id_source: Uuid::new_v4,
            update_uniqueness: UpdateUniqueness::default(),
        }
    }

    /// Replaces the id generator (deterministic ids in tests).
    pub fn with_id_source(mut self, id_source: fn() -> ContactId) -> Self {
        self.id_source = id_source;
        self
    }

    /// Selects the update uniqueness policy.
    pub fn with_update_uniqueness(mut self, policy: UpdateUniqueness) -> Self {
        self.update_uniqueness = policy;
        self
    }

    /// Creates a contact after username then email uniqueness checks.
    ///
    /// # Contract
    /// - Generates the id before any check.
    /// - On conflict, returns `DuplicateOnCreate` without writing.
    /// - On success, performs exactly one insert.
    pub fn create_contact(&self, fields: NewContact) -> ServiceResult<Contact> {
        let contact = Contact::with_id((self.id_source)(), fields).map_err(RepoError::from)?;

        if contact_username_exists(&self.repo, &contact.username)? {
            warn!("event=contact_create module=service status=conflict field=username");
            return Err(ContactServiceError::DuplicateOnCreate {
                field: UniqueField::Username,
                value: contact.username,
            });
        }

        if contact_email_exists(&self.repo, &contact.email)? {
            warn!("event=contact_create module=service status=conflict field=email");
            return Err(ContactServiceError::DuplicateOnCreate {
                field: UniqueField::Email,
                value: contact.email,
            });
        }

        self.repo.insert_contact(&contact)?;
        info!(
            "event=contact_create module=service status=ok contact_id={}",
            contact.id
        );
        Ok(contact)
    }

    /// Lists every stored contact in store order.
    pub fn list_contacts(&self) -> ServiceResult<Vec<Contact>> {
        Ok(self.repo.list_contacts()?)
    }

    /// Gets a contact by exact, case-sensitive username.
    pub fn get_contact_by_username(&self, username: &str) -> ServiceResult<Contact> {
        self.repo
            .find_contact(ContactFilter::Username(username))?
            .ok_or_else(|| ContactServiceError::UsernameNotFound(username.to_string()))
    }

    /// Deletes a contact by id.
    pub fn delete_contact(&self, id: ContactId) -> ServiceResult<()> {
        if self.repo.find_contact(ContactFilter::Id(id))?.is_none() {
            return Err(ContactServiceError::DeleteTargetNotFound(id));
        }

        self.repo.delete_contact(id).map_err(|err| match err {
            RepoError::NotFound(id) => ContactServiceError::DeleteTargetNotFound(id),
            other => ContactServiceError::Repo(other),
        })?;
        info!("event=contact_delete module=service status=ok contact_id={id}");
        Ok(())
    }

    /// Applies a partial update to an existing contact.
    ///
    /// # Contract
    /// - Missing target fails before any uniqueness check.
    /// - Username is checked before email, each only when supplied.
    /// - Fields absent from `patch` keep their stored values.
    pub fn update_contact(&self, id: ContactId, patch: ContactPatch) -> ServiceResult<Contact> {
        let mut contact = self
            .repo
            .find_contact(ContactFilter::Id(id))?
            .ok_or(ContactServiceError::UpdateTargetNotFound(id))?;

        if let Some(candidate) = patch.username.as_deref() {
            self.ensure_update_is_unique(&contact, UniqueField::Username, candidate)?;
        }
        if let Some(candidate) = patch.email.as_deref() {
            self.ensure_update_is_unique(&contact, UniqueField::Email, candidate)?;
        }

        contact.apply(patch);
        self.repo.update_contact(&contact).map_err(|err| match err {
            RepoError::NotFound(id) => ContactServiceError::UpdateTargetNotFound(id),
            other => ContactServiceError::Repo(other),
        })?;
        info!(
            "event=contact_update module=service status=ok contact_id={}",
            contact.id
        );
        Ok(contact)
    }

    fn ensure_update_is_unique(
        &self,
        target: &Contact,
        field: UniqueField,
        candidate: &str,
    ) -> ServiceResult<()> {
        let conflict = match self.update_uniqueness {
            UpdateUniqueness::Stored => {
                let stored = field.value_of(target);
                find_holder(&self.repo, field, stored)?.map(|_| stored.to_string())
            }
            UpdateUniqueness::Candidate => find_holder(&self.repo, field, candidate)?
                .filter(|holder| holder.id != target.id)
                .map(|_| candidate.to_string()),
        };

        match conflict {
            Some(value) => {
                warn!(
                    "event=contact_update module=service status=conflict field={} contact_id={}",
                    field.as_str(),
                    target.id
                );
                Err(ContactServiceError::DuplicateOnUpdate { field, value })
            }
            None => Ok(()),
        }
    }
}
