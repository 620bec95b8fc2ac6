//! Core domain logic for the contact directory.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::contact::{Contact, ContactId, ContactPatch, ContactValidationError, NewContact};
pub use model::validation::{validate_email, validate_username, ContactField, FieldError};
pub use repo::contact_repo::{
    ContactFilter, ContactRepository, RepoError, RepoResult, SqliteContactRepository,
};
pub use schema::{decode_full, decode_partial, ContactList, DecodeMode, SchemaError};
pub use service::contact_service::{
    ContactService, ContactServiceError, ServiceResult, UpdateUniqueness,
};
pub use service::uniqueness::{contact_email_exists, contact_username_exists, UniqueField};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
