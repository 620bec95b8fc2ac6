//! HTTP surface for the contact directory.
//!
//! # Responsibility
//! - Expose the `/contacts` resource over axum.
//! - Translate core errors into the `{ "errors": [...] }` envelope.

pub mod config;
pub mod error;
pub mod routes;

pub use config::{Args, UpdateUniquenessArg};
pub use error::{ApiFailure, ErrorBody, ErrorItem};
pub use routes::{app, AppState};
