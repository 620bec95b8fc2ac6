//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence contract the contact service depends on.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Contact::validate()` before persistence.
//! - Each write commits as one unit; there is no caller-visible session.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod contact_repo;
