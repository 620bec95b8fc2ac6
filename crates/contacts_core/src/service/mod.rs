//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate uniqueness checks and repository calls into the contact
//!   create/list/get/delete/update use-cases.
//! - Keep HTTP layers decoupled from storage details.

pub mod contact_service;
pub mod uniqueness;
