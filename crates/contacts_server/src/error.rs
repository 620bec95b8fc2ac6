//! HTTP error envelope.
//!
//! # Responsibility
//! - Map schema, service and infrastructure failures to status + body.
//!
//! # Invariants
//! - Client-caused failures are always `400` with `{ "errors": [...] }`.
//! - Store failures are `500`; their details are logged, never returned.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contacts_core::{ContactServiceError, SchemaError};
use log::error;
use serde::Serialize;
use std::fmt::Display;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorItem {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

/// Failed request outcome.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub errors: Vec<ErrorItem>,
}

impl ApiFailure {
    /// Single-message `400`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            errors: vec![ErrorItem {
                message: message.into(),
                field: None,
            }],
        }
    }

    /// Logs `err` and returns an opaque `500`.
    pub fn internal(code: &'static str, err: impl Display) -> Self {
        error!("event=http_failure module=server status=error error_code={code} error={err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            errors: vec![ErrorItem {
                message: INTERNAL_ERROR_MESSAGE.to_string(),
                field: None,
            }],
        }
    }

    pub fn invalid_json(rejection: &JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }

    pub fn invalid_contact_id(raw: &str) -> Self {
        Self::bad_request(format!("Sorry, {raw} is not a valid contact id"))
    }
}

impl From<SchemaError> for ApiFailure {
    fn from(value: SchemaError) -> Self {
        match value {
            SchemaError::NotAnObject => Self::bad_request(SchemaError::NotAnObject.to_string()),
            SchemaError::InvalidFields(errors) => Self {
                status: StatusCode::BAD_REQUEST,
                errors: errors
                    .into_iter()
                    .map(|error| ErrorItem {
                        message: error.message,
                        field: Some(error.field),
                    })
                    .collect(),
            },
        }
    }
}

impl From<ContactServiceError> for ApiFailure {
    fn from(value: ContactServiceError) -> Self {
        if value.is_client_error() {
            Self::bad_request(value.to_string())
        } else {
            Self::internal("store_failed", value)
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                errors: self.errors,
            }),
        )
            .into_response()
    }
}
