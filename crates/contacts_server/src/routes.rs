//! Request handlers for the `/contacts` resource.
//!
//! # Responsibility
//! - Decode bodies through the contact schema and path ids into UUIDs.
//! - Run one service call per request against a fresh store connection,
//!   on tokio's blocking pool.
//! - Shape success bodies and delegate failures to `ApiFailure`.
//!
//! # Invariants
//! - No mutable state is shared across requests; all state lives in SQLite.
//! - Decode failures never reach the store.

use crate::error::ApiFailure;
use axum::extract::rejection::JsonRejection;
use axum::extract::{MatchedPath, Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use contacts_core::db::open_db;
use contacts_core::{
    core_version, decode_full, decode_partial, Contact, ContactId, ContactList, ContactService,
    ServiceResult, SqliteContactRepository, UpdateUniqueness,
};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

/// Per-process configuration shared by handlers. Immutable.
#[derive(Debug, Clone)]
pub struct AppState {
    db_path: PathBuf,
    update_uniqueness: UpdateUniqueness,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, update_uniqueness: UpdateUniqueness) -> Self {
        Self {
            db_path: db_path.into(),
            update_uniqueness,
        }
    }

    /// Runs `op` against a fresh service on the blocking pool.
    ///
    /// SQLite calls may wait on the busy timeout; they never run on a
    /// runtime worker.
    async fn with_service<T, F>(&self, op: F) -> Result<T, ApiFailure>
    where
        T: Send + 'static,
        F: FnOnce(&ContactService<SqliteContactRepository<'_>>) -> ServiceResult<T>
            + Send
            + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.run_service(op))
            .await
            .map_err(|err| ApiFailure::internal("task_join_failed", err))?
    }

    /// Opens the store, builds a service and runs `op` against it.
    fn run_service<T>(
        &self,
        op: impl FnOnce(&ContactService<SqliteContactRepository<'_>>) -> ServiceResult<T>,
    ) -> Result<T, ApiFailure> {
        let conn =
            open_db(&self.db_path).map_err(|err| ApiFailure::internal("db_open_failed", err))?;
        let repo = SqliteContactRepository::try_new(&conn)
            .map_err(|err| ApiFailure::internal("repo_init_failed", err))?;
        let service = ContactService::new(repo).with_update_uniqueness(self.update_uniqueness);
        op(&service).map_err(ApiFailure::from)
    }
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Builds the service router.
///
/// `/contacts/:key` takes a username for GET and a contact id for
/// DELETE/PATCH/PUT/POST.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/", get(list_contacts).post(create_contact))
        .route(
            "/contacts/:key",
            get(get_contact_by_username)
                .delete(delete_contact)
                .patch(update_contact)
                .put(update_contact)
                .post(update_contact),
        )
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: core_version(),
    })
}

async fn create_contact(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Contact>, ApiFailure> {
    let Json(body) = payload.map_err(|rejection| ApiFailure::invalid_json(&rejection))?;
    let fields = decode_full(&body)?;
    let contact = state
        .with_service(move |service| service.create_contact(fields))
        .await?;
    Ok(Json(contact))
}

async fn list_contacts(State(state): State<AppState>) -> Result<Response, ApiFailure> {
    let contacts = state
        .with_service(|service| service.list_contacts())
        .await?;
    Ok(Json(ContactList {
        contacts: &contacts,
    })
    .into_response())
}

async fn get_contact_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Contact>, ApiFailure> {
    let contact = state
        .with_service(move |service| service.get_contact_by_username(&username))
        .await?;
    Ok(Json(contact))
}

async fn delete_contact(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let id = parse_contact_id(&raw_id)?;
    state
        .with_service(move |service| service.delete_contact(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_contact(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Contact>, ApiFailure> {
    let id = parse_contact_id(&raw_id)?;
    let Json(body) = payload.map_err(|rejection| ApiFailure::invalid_json(&rejection))?;
    let patch = decode_partial(&body)?;
    let contact = state
        .with_service(move |service| service.update_contact(id, patch))
        .await?;
    Ok(Json(contact))
}

fn parse_contact_id(raw: &str) -> Result<ContactId, ApiFailure> {
    ContactId::parse_str(raw).map_err(|_| ApiFailure::invalid_contact_id(raw))
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    // Route template only; raw paths may carry usernames.
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    info!(
        "event=http_request module=server method={} route={} status={} duration_ms={}",
        method,
        route,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

#[cfg(test)]
mod tests {
    use super::parse_contact_id;

    #[test]
    fn parse_contact_id_accepts_hyphenated_uuid() {
        let id = parse_contact_id("7e8377af-bdc3-4b9e-a491-2d9ddff3253f").unwrap();
        assert_eq!(id.to_string(), "7e8377af-bdc3-4b9e-a491-2d9ddff3253f");
    }

    #[test]
    fn parse_contact_id_rejects_garbage() {
        let failure = parse_contact_id("testusername1234").unwrap_err();
        assert_eq!(
            failure.errors[0].message,
            "Sorry, testusername1234 is not a valid contact id"
        );
    }
}
