use contacts_core::db::open_db_in_memory;
use contacts_core::{
    Contact, ContactFilter, ContactId, ContactPatch, ContactRepository, ContactService,
    ContactServiceError, NewContact, RepoError, RepoResult, SqliteContactRepository, UniqueField,
    UpdateUniqueness,
};
use std::cell::{Cell, RefCell};
use uuid::Uuid;

const FIXED_ID: &str = "7e8377af-bdc3-4b9e-a491-2d9ddff3253f";

fn fixed_id() -> ContactId {
    Uuid::parse_str(FIXED_ID).unwrap()
}

/// In-memory repository that counts writes and records lookups.
#[derive(Default)]
struct RecordingRepo {
    rows: RefCell<Vec<Contact>>,
    writes: Cell<usize>,
    lookups: RefCell<Vec<String>>,
}

impl RecordingRepo {
    fn with_rows(rows: Vec<Contact>) -> Self {
        Self {
            rows: RefCell::new(rows),
            ..Self::default()
        }
    }

    fn writes(&self) -> usize {
        self.writes.get()
    }

    fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl ContactRepository for RecordingRepo {
    fn insert_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        self.writes.set(self.writes.get() + 1);
        self.rows.borrow_mut().push(contact.clone());
        Ok(contact.id)
    }

    fn update_contact(&self, contact: &Contact) -> RepoResult<()> {
        self.writes.set(self.writes.get() + 1);
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .iter_mut()
            .find(|row| row.id == contact.id)
            .ok_or(RepoError::NotFound(contact.id))?;
        *row = contact.clone();
        Ok(())
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        self.writes.set(self.writes.get() + 1);
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn find_contact(&self, filter: ContactFilter<'_>) -> RepoResult<Option<Contact>> {
        self.lookups.borrow_mut().push(format!("{filter:?}"));
        Ok(self
            .rows
            .borrow()
            .iter()
            .find(|row| filter.matches(row))
            .cloned())
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        Ok(self.rows.borrow().clone())
    }
}

fn create_input() -> NewContact {
    NewContact {
        first_name: "tesfirstname".to_string(),
        surname: "testsurname".to_string(),
        username: "testusername1234".to_string(),
        email: "testemail2@gmail.com".to_string(),
    }
}

fn stored(id: &str, username: &str, email: &str) -> Contact {
    Contact::with_id(
        Uuid::parse_str(id).unwrap(),
        NewContact {
            first_name: "testfirstname".to_string(),
            surname: "testsurname".to_string(),
            username: username.to_string(),
            email: email.to_string(),
        },
    )
    .unwrap()
}

fn full_patch() -> ContactPatch {
    ContactPatch {
        first_name: Some("tesfirstnameUPDATED".to_string()),
        surname: Some("testsurnameUPDATED".to_string()),
        username: Some("testusername1234UPDATED".to_string()),
        email: Some("testemail2comUPDATED@gmail.com".to_string()),
    }
}

#[test]
fn create_returns_input_with_generated_id_and_writes_once() {
    let repo = RecordingRepo::default();
    let service = ContactService::new(&repo).with_id_source(fixed_id);

    let created = service.create_contact(create_input()).unwrap();

    assert_eq!(created.id, fixed_id());
    assert_eq!(created.first_name, "tesfirstname");
    assert_eq!(created.surname, "testsurname");
    assert_eq!(created.username, "testusername1234");
    assert_eq!(created.email, "testemail2@gmail.com");
    assert_eq!(repo.writes(), 1);
}

#[test]
fn create_with_existing_username_ignoring_case_is_conflict_without_writes() {
    let repo = RecordingRepo::with_rows(vec![stored(
        "11111111-2222-4333-8444-555555555555",
        "TestUsername1234",
        "other@gmail.com",
    )]);
    let service = ContactService::new(&repo);

    let err = service.create_contact(create_input()).unwrap_err();

    assert!(err.is_client_error());
    assert_eq!(
        err.to_string(),
        "Sorry, the username testusername1234 of the contact you try to add already exists"
    );
    assert_eq!(repo.writes(), 0);
}

#[test]
fn create_with_existing_email_is_conflict_without_writes() {
    let repo = RecordingRepo::with_rows(vec![stored(
        "11111111-2222-4333-8444-555555555555",
        "someoneelse",
        "TESTEMAIL2@gmail.com",
    )]);
    let service = ContactService::new(&repo);

    let err = service.create_contact(create_input()).unwrap_err();

    assert!(matches!(
        err,
        ContactServiceError::DuplicateOnCreate {
            field: UniqueField::Email,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "Sorry, the email testemail2@gmail.com of the contact you try to add already exists"
    );
    assert_eq!(repo.writes(), 0);
}

#[test]
fn list_preserves_store_order() {
    let first = stored(
        "11111111-2222-4333-8444-555555555555",
        "testusername1234",
        "testemail1@gmail.com",
    );
    let second = stored(
        "21111111-2222-4333-8444-555555555555",
        "testusername4567",
        "testemail12@gmail.com",
    );
    let repo = RecordingRepo::with_rows(vec![first.clone(), second.clone()]);
    let service = ContactService::new(&repo);

    assert_eq!(service.list_contacts().unwrap(), vec![first, second]);
}

#[test]
fn get_by_username_is_case_sensitive() {
    let repo = RecordingRepo::with_rows(vec![stored(
        FIXED_ID,
        "testusername1234",
        "testemail1@gmail.com",
    )]);
    let service = ContactService::new(&repo);

    let found = service.get_contact_by_username("testusername1234").unwrap();
    assert_eq!(found.id, fixed_id());

    let err = service
        .get_contact_by_username("TESTUSERNAME1234")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Sorry, there is no contact with the username TESTUSERNAME1234"
    );
}

#[test]
fn delete_missing_is_not_found_without_writes() {
    let repo = RecordingRepo::default();
    let service = ContactService::new(&repo);

    let err = service.delete_contact(fixed_id()).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Sorry, the contact 7e8377af-bdc3-4b9e-a491-2d9ddff3253f you try to delete does not exist"
    );
    assert_eq!(repo.writes(), 0);
}

#[test]
fn delete_existing_writes_once() {
    let repo = RecordingRepo::with_rows(vec![stored(
        FIXED_ID,
        "testusername1234",
        "testemail1@gmail.com",
    )]);
    let service = ContactService::new(&repo);

    service.delete_contact(fixed_id()).unwrap();

    assert_eq!(repo.writes(), 1);
    assert!(repo.list_contacts().unwrap().is_empty());
}

#[test]
fn update_missing_is_not_found_before_other_checks() {
    let repo = RecordingRepo::default();
    let service = ContactService::new(&repo);

    let err = service.update_contact(fixed_id(), full_patch()).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Sorry, the contact 7e8377af-bdc3-4b9e-a491-2d9ddff3253f you try to update does not exist"
    );
    assert_eq!(repo.lookups(), vec![format!("Id({FIXED_ID})")]);
    assert_eq!(repo.writes(), 0);
}

#[test]
fn update_applies_all_fields_and_writes_once() {
    let repo = RecordingRepo::with_rows(vec![stored(
        FIXED_ID,
        "testusername1234",
        "testemail1@gmail.com",
    )]);
    let service = ContactService::new(&repo);

    let updated = service.update_contact(fixed_id(), full_patch()).unwrap();

    assert_eq!(updated.id, fixed_id());
    assert_eq!(updated.first_name, "tesfirstnameUPDATED");
    assert_eq!(updated.surname, "testsurnameUPDATED");
    assert_eq!(updated.username, "testusername1234UPDATED");
    assert_eq!(updated.email, "testemail2comUPDATED@gmail.com");
    assert_eq!(repo.writes(), 1);
}

#[test]
fn partial_update_leaves_other_fields_unchanged() {
    let original = stored(FIXED_ID, "testusername1234", "testemail1@gmail.com");
    let repo = RecordingRepo::with_rows(vec![original.clone()]);
    let service = ContactService::new(&repo);

    let updated = service
        .update_contact(
            fixed_id(),
            ContactPatch {
                first_name: Some("renamed".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.first_name, "renamed");
    assert_eq!(updated.surname, original.surname);
    assert_eq!(updated.username, original.username);
    assert_eq!(updated.email, original.email);
    assert_eq!(repo.list_contacts().unwrap(), vec![updated]);
}

#[test]
fn candidate_policy_rejects_value_held_by_another_contact() {
    let repo = RecordingRepo::with_rows(vec![
        stored(FIXED_ID, "testusername1234", "testemail1@gmail.com"),
        stored(
            "21111111-2222-4333-8444-555555555555",
            "takenusername",
            "taken@gmail.com",
        ),
    ]);
    let service = ContactService::new(&repo);

    let err = service
        .update_contact(
            fixed_id(),
            ContactPatch {
                surname: Some("changed".to_string()),
                username: Some("TakenUsername".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Sorry, you cannot update the contact with the username TakenUsername: it already exists"
    );
    assert_eq!(repo.writes(), 0);
    let unchanged = repo.list_contacts().unwrap();
    assert_eq!(unchanged[0].surname, "testsurname");
}

#[test]
fn candidate_policy_allows_keeping_or_recasing_own_values() {
    let repo = RecordingRepo::with_rows(vec![stored(
        FIXED_ID,
        "testusername1234",
        "testemail1@gmail.com",
    )]);
    let service = ContactService::new(&repo);

    let updated = service
        .update_contact(
            fixed_id(),
            ContactPatch {
                username: Some("TestUsername1234".to_string()),
                email: Some("testemail1@gmail.com".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.username, "TestUsername1234");
    assert_eq!(repo.writes(), 1);
}

#[test]
fn stored_policy_checks_current_username_and_reports_it() {
    let repo = RecordingRepo::with_rows(vec![stored(
        FIXED_ID,
        "testusername1234",
        "testemail1@gmail.com",
    )]);
    let service = ContactService::new(&repo).with_update_uniqueness(UpdateUniqueness::Stored);

    let err = service.update_contact(fixed_id(), full_patch()).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Sorry, you cannot update the contact with the username testusername1234: it already exists"
    );
    assert_eq!(repo.writes(), 0);
}

#[test]
fn stored_policy_checks_current_email_when_only_email_supplied() {
    let repo = RecordingRepo::with_rows(vec![stored(
        FIXED_ID,
        "testusername1234",
        "testemail1@gmail.com",
    )]);
    let service = ContactService::new(&repo).with_update_uniqueness(UpdateUniqueness::Stored);

    let err = service
        .update_contact(
            fixed_id(),
            ContactPatch {
                email: Some("testemail2comUPDATED@gmail.com".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Sorry, you cannot update the contact with the email testemail1@gmail.com: it already exists"
    );
    assert_eq!(repo.writes(), 0);
}

#[test]
fn stored_policy_skips_checks_when_unique_fields_absent() {
    let repo = RecordingRepo::with_rows(vec![stored(
        FIXED_ID,
        "testusername1234",
        "testemail1@gmail.com",
    )]);
    let service = ContactService::new(&repo).with_update_uniqueness(UpdateUniqueness::Stored);

    let updated = service
        .update_contact(
            fixed_id(),
            ContactPatch {
                surname: Some("onlysurname".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.surname, "onlysurname");
    assert_eq!(repo.writes(), 1);
}

#[test]
fn service_over_sqlite_end_to_end() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let service = ContactService::new(repo);

    let created = service.create_contact(create_input()).unwrap();
    let err = service
        .create_contact(NewContact {
            username: "TESTUSERNAME1234".to_string(),
            email: "another@gmail.com".to_string(),
            ..create_input()
        })
        .unwrap_err();
    assert!(matches!(err, ContactServiceError::DuplicateOnCreate { .. }));

    let updated = service
        .update_contact(
            created.id,
            ContactPatch {
                email: Some("moved@gmail.com".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap();
    assert_eq!(
        service.get_contact_by_username("testusername1234").unwrap(),
        updated
    );

    service.delete_contact(created.id).unwrap();
    let err = service.delete_contact(created.id).unwrap_err();
    assert!(matches!(err, ContactServiceError::DeleteTargetNotFound(_)));
}
