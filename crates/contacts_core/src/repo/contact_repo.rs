//! Contact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete, first-match lookup and full listing over
//!   the `contacts` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Contact::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Listing and first-match lookups follow insertion order (`created_seq`).

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::contact::{Contact, ContactId, ContactValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    surname,
    username,
    email
FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Field-equality filter for first-match lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFilter<'a> {
    Id(ContactId),
    /// Exact, case-sensitive username match.
    Username(&'a str),
    /// Username match ignoring ASCII case.
    UsernameIgnoreCase(&'a str),
    /// Email match ignoring ASCII case.
    EmailIgnoreCase(&'a str),
}

impl ContactFilter<'_> {
    /// Returns true when `contact` satisfies this filter.
    ///
    /// Mirrors the SQL predicate; used by in-memory implementations.
    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            Self::Id(id) => contact.id == *id,
            Self::Username(username) => contact.username == *username,
            Self::UsernameIgnoreCase(username) => contact.username.eq_ignore_ascii_case(username),
            Self::EmailIgnoreCase(email) => contact.email.eq_ignore_ascii_case(email),
        }
    }
}

/// Persistence contract for the contact collection.
pub trait ContactRepository {
    /// Inserts and commits a new contact.
    fn insert_contact(&self, contact: &Contact) -> RepoResult<ContactId>;
    /// Overwrites the business fields of an existing contact and commits.
    fn update_contact(&self, contact: &Contact) -> RepoResult<()>;
    /// Deletes a contact by id and commits.
    fn delete_contact(&self, id: ContactId) -> RepoResult<()>;
    /// Returns the first contact (insertion order) matching `filter`.
    fn find_contact(&self, filter: ContactFilter<'_>) -> RepoResult<Option<Contact>>;
    /// Returns every stored contact in insertion order.
    fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
}

impl<R: ContactRepository + ?Sized> ContactRepository for &R {
    fn insert_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        (**self).insert_contact(contact)
    }

    fn update_contact(&self, contact: &Contact) -> RepoResult<()> {
        (**self).update_contact(contact)
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        (**self).delete_contact(id)
    }

    fn find_contact(&self, filter: ContactFilter<'_>) -> RepoResult<Option<Contact>> {
        (**self).find_contact(filter)
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        (**self).list_contacts()
    }
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Constructs a repository from a connection returned by `open_db*`.
    ///
    /// Rejects connections whose schema version is not the one this binary
    /// migrates to.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        if version != latest_version() {
            return Err(RepoError::InvalidData(format!(
                "connection schema version {version} does not match expected {}",
                latest_version()
            )));
        }
        Ok(Self { conn })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn insert_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        contact.validate()?;

        self.conn.execute(
            "INSERT INTO contacts (
                id,
                first_name,
                surname,
                username,
                email
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                contact.id.to_string(),
                contact.first_name.as_str(),
                contact.surname.as_str(),
                contact.username.as_str(),
                contact.email.as_str(),
            ],
        )?;

        Ok(contact.id)
    }

    fn update_contact(&self, contact: &Contact) -> RepoResult<()> {
        contact.validate()?;

        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                first_name = ?1,
                surname = ?2,
                username = ?3,
                email = ?4
             WHERE id = ?5;",
            params![
                contact.first_name.as_str(),
                contact.surname.as_str(),
                contact.username.as_str(),
                contact.email.as_str(),
                contact.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(contact.id));
        }

        Ok(())
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn find_contact(&self, filter: ContactFilter<'_>) -> RepoResult<Option<Contact>> {
        let (predicate, value) = match filter {
            ContactFilter::Id(id) => ("id = ?1", id.to_string()),
            // The column collates NOCASE, so exact matching must opt out.
            ContactFilter::Username(username) => {
                ("username = ?1 COLLATE BINARY", username.to_string())
            }
            ContactFilter::UsernameIgnoreCase(username) => {
                ("username = ?1 COLLATE NOCASE", username.to_string())
            }
            ContactFilter::EmailIgnoreCase(email) => {
                ("email = ?1 COLLATE NOCASE", email.to_string())
            }
        };

        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL}
             WHERE {predicate}
             ORDER BY created_seq ASC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }

        Ok(None)
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} ORDER BY created_seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in contacts.id"))
    })?;

    let contact = Contact {
        id,
        first_name: row.get("first_name")?,
        surname: row.get("surname")?,
        username: row.get("username")?,
        email: row.get("email")?,
    };
    contact
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("contact row `{id_text}`: {err}")))?;
    Ok(contact)
}
