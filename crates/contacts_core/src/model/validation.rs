//! Field rules for contact values.
//!
//! # Responsibility
//! - Provide pure format checks (`validate_username`, `validate_email`).
//! - Declare the per-field rule table consumed by the schema layer and by
//!   `Contact::validate()`.
//!
//! # Invariants
//! - Lengths are counted in Unicode scalar values, not bytes.
//! - The username regex is the single source of truth for its bounds.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

pub const NAME_MIN_CHARS: usize = 1;
pub const NAME_MAX_CHARS: usize = 50;
pub const USERNAME_MIN_CHARS: usize = 6;
pub const USERNAME_MAX_CHARS: usize = 32;
pub const EMAIL_MIN_CHARS: usize = 5;
pub const EMAIL_MAX_CHARS: usize = 128;

pub const USERNAME_FORMAT_MESSAGE: &str =
    "Username must be 6-32 characters length and can only contain: a-zA-Z0-9.";
pub const EMAIL_FORMAT_MESSAGE: &str = "Not a valid email address.";

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z0-9]|\.){6,32}$").expect("valid username regex"));

/// Business fields of a contact, in the order updates are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FirstName,
    Surname,
    Username,
    Email,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::FirstName,
        ContactField::Surname,
        ContactField::Username,
        ContactField::Email,
    ];

    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::Surname => "surname",
            Self::Username => "username",
            Self::Email => "email",
        }
    }

    /// Declarative rule for this field.
    pub fn rule(self) -> &'static FieldRule {
        match self {
            Self::FirstName => &FIELD_RULES[0],
            Self::Surname => &FIELD_RULES[1],
            Self::Username => &FIELD_RULES[2],
            Self::Email => &FIELD_RULES[3],
        }
    }
}

/// Format check applied after the length check passes.
#[derive(Clone, Copy)]
pub struct FieldFormat {
    pub check: fn(&str) -> bool,
    pub message: &'static str,
}

/// Declarative constraints for one business field.
#[derive(Clone, Copy)]
pub struct FieldRule {
    pub field: ContactField,
    /// Required when decoding a full (create) payload.
    pub required: bool,
    pub min_chars: usize,
    pub max_chars: usize,
    pub format: Option<FieldFormat>,
}

pub static FIELD_RULES: [FieldRule; 4] = [
    FieldRule {
        field: ContactField::FirstName,
        required: true,
        min_chars: NAME_MIN_CHARS,
        max_chars: NAME_MAX_CHARS,
        format: None,
    },
    FieldRule {
        field: ContactField::Surname,
        required: true,
        min_chars: NAME_MIN_CHARS,
        max_chars: NAME_MAX_CHARS,
        format: None,
    },
    FieldRule {
        field: ContactField::Username,
        required: true,
        min_chars: USERNAME_MIN_CHARS,
        max_chars: USERNAME_MAX_CHARS,
        format: Some(FieldFormat {
            check: validate_username,
            message: USERNAME_FORMAT_MESSAGE,
        }),
    },
    FieldRule {
        field: ContactField::Email,
        required: true,
        min_chars: EMAIL_MIN_CHARS,
        max_chars: EMAIL_MAX_CHARS,
        format: Some(FieldFormat {
            check: validate_email,
            message: EMAIL_FORMAT_MESSAGE,
        }),
    },
];

/// One failing field with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the offending field (`id` included).
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl FieldRule {
    /// Checks one present value against length then format.
    pub fn check(&self, value: &str) -> Result<(), FieldError> {
        let len = value.chars().count();
        if len < self.min_chars || len > self.max_chars {
            return Err(FieldError::new(
                self.field.as_str(),
                format!(
                    "Length must be between {} and {}.",
                    self.min_chars, self.max_chars
                ),
            ));
        }

        if let Some(format) = self.format {
            if !(format.check)(value) {
                return Err(FieldError::new(self.field.as_str(), format.message));
            }
        }

        Ok(())
    }
}

/// Returns true when `username` is 6-32 ASCII letters, digits or dots.
pub fn validate_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

/// Returns true when `email` is a plausible single-`@` address of 5-128 chars.
///
/// The domain part must contain a dot that is neither its first nor last
/// character. Whitespace anywhere is rejected.
pub fn validate_email(email: &str) -> bool {
    let len = email.chars().count();
    if !(EMAIL_MIN_CHARS..=EMAIL_MAX_CHARS).contains(&len) {
        return false;
    }
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::{validate_email, validate_username, ContactField};

    #[test]
    fn username_accepts_alphanumerics_and_dots() {
        assert!(validate_username("testusername1234"));
        assert!(validate_username("john.doe"));
        assert!(validate_username("......"));
    }

    #[test]
    fn username_rejects_other_characters() {
        assert!(!validate_username("john_doe"));
        assert!(!validate_username("john doe"));
        assert!(!validate_username("jöhndoe"));
        assert!(!validate_username("john-doe"));
    }

    #[test]
    fn username_bounds_are_six_to_thirty_two() {
        assert!(!validate_username("abcde"));
        assert!(validate_username("abcdef"));
        assert!(validate_username(&"a".repeat(32)));
        assert!(!validate_username(&"a".repeat(33)));
        assert!(!validate_username(&"a".repeat(52)));
    }

    #[test]
    fn email_requires_single_at_and_dotted_domain() {
        assert!(validate_email("testemail2@gmail.com"));
        assert!(validate_email("a@b.c"));
        assert!(!validate_email("testemail2gmail.com"));
        assert!(!validate_email("a@b@gmail.com"));
        assert!(!validate_email("@gmail.com"));
        assert!(!validate_email("someone@localhost"));
        assert!(!validate_email("someone@.com"));
        assert!(!validate_email("someone@gmail."));
        assert!(!validate_email("some one@gmail.com"));
    }

    #[test]
    fn email_enforces_length_bounds() {
        assert!(!validate_email("a@.b"));
        let local = "a".repeat(122);
        assert!(validate_email(&format!("{local}@b.com")));
        assert!(!validate_email(&format!("{local}a@b.com")));
    }

    #[test]
    fn rule_check_reports_length_before_format() {
        let err = ContactField::Username.rule().check("ab").unwrap_err();
        assert_eq!(err.field, "username");
        assert_eq!(err.message, "Length must be between 6 and 32.");

        let err = ContactField::Username
            .rule()
            .check("bad_username")
            .unwrap_err();
        assert_eq!(
            err.message,
            "Username must be 6-32 characters length and can only contain: a-zA-Z0-9."
        );
    }

    #[test]
    fn name_rules_count_characters_not_bytes() {
        let name = "é".repeat(50);
        assert!(ContactField::FirstName.rule().check(&name).is_ok());
        assert!(ContactField::Surname.rule().check("").is_err());
    }
}
