//! Contact domain model.
//!
//! # Responsibility
//! - Define the canonical `Contact` record and its write-side shapes.
//! - Own the field rules every stored contact must satisfy.
//!
//! # Invariants
//! - Every contact is identified by a server-assigned `ContactId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod contact;
pub mod validation;
