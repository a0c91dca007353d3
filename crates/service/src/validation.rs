//! Field validation rules for the login form.
//!
//! Everything here is pure: a value goes in, a verdict comes out.

use models::FieldKind;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// `local@domain.tld` shape: no whitespace, exactly one `@`, a dot in the domain.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;

/// Inline, recoverable validation failures. `Display` is the message shown
/// under the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", empty_message(.0))]
    EmptyField(FieldKind),
    #[error("Please provide a valid email address.")]
    InvalidFormat(FieldKind),
    #[error("Password must be at least {min} characters long.")]
    TooShort { field: FieldKind, min: usize },
}

fn empty_message(field: &FieldKind) -> &'static str {
    match field {
        FieldKind::Username => "Please provide a valid username.",
        FieldKind::Password => "Please provide a valid password.",
    }
}

impl ValidationError {
    pub fn field(&self) -> FieldKind {
        match self {
            ValidationError::EmptyField(f) | ValidationError::InvalidFormat(f) => *f,
            ValidationError::TooShort { field, .. } => *field,
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ValidationError::EmptyField(_) => 1001,
            ValidationError::InvalidFormat(_) => 1002,
            ValidationError::TooShort { .. } => 1003,
        }
    }
}

pub type FieldResult = Result<(), ValidationError>;

/// Both field verdicts from a whole-form check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidation {
    pub username: FieldResult,
    pub password: FieldResult,
}

impl FormValidation {
    pub fn is_valid(&self) -> bool {
        self.username.is_ok() && self.password.is_ok()
    }

    pub fn get(&self, field: FieldKind) -> &FieldResult {
        match field {
            FieldKind::Username => &self.username,
            FieldKind::Password => &self.password,
        }
    }
}

/// True when `value` has the `local@domain.tld` shape.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

#[derive(Debug, Clone)]
pub struct FieldValidator {
    min_password_len: usize,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self { min_password_len: DEFAULT_MIN_PASSWORD_LEN }
    }
}

impl FieldValidator {
    pub fn new(min_password_len: usize) -> Self {
        Self { min_password_len }
    }

    pub fn min_password_len(&self) -> usize {
        self.min_password_len
    }

    pub fn validate(&self, field: FieldKind, raw: &str) -> FieldResult {
        match field {
            FieldKind::Username => self.validate_username(raw),
            FieldKind::Password => self.validate_password(raw),
        }
    }

    /// The username is trimmed before both checks.
    pub fn validate_username(&self, raw: &str) -> FieldResult {
        let username = raw.trim();
        if username.is_empty() {
            return Err(ValidationError::EmptyField(FieldKind::Username));
        }
        if !is_valid_email(username) {
            return Err(ValidationError::InvalidFormat(FieldKind::Username));
        }
        Ok(())
    }

    /// The password is taken verbatim; length counts characters.
    pub fn validate_password(&self, raw: &str) -> FieldResult {
        if raw.is_empty() {
            return Err(ValidationError::EmptyField(FieldKind::Password));
        }
        if raw.chars().count() < self.min_password_len {
            return Err(ValidationError::TooShort { field: FieldKind::Password, min: self.min_password_len });
        }
        Ok(())
    }

    /// Runs both validators unconditionally.
    pub fn validate_form(&self, username: &str, password: &str) -> FormValidation {
        FormValidation {
            username: self.validate_username(username),
            password: self.validate_password(password),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        let v = FieldValidator::default();
        assert_eq!(v.validate_username("   "), Err(ValidationError::EmptyField(FieldKind::Username)));
        assert_eq!(v.validate_username(" a@b.com "), Ok(()));
        for bad in ["plainaddress", "a@b", "a@@b.com", "a b@c.com", "@b.com", "a@.", "a@b."] {
            assert_eq!(
                v.validate_username(bad),
                Err(ValidationError::InvalidFormat(FieldKind::Username)),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn usernames_without_at_or_dotted_domain_are_invalid_format() {
        let v = FieldValidator::default();
        for local in ["john", "john.doe", "x1"] {
            assert!(matches!(v.validate_username(local), Err(ValidationError::InvalidFormat(_))));
            let no_dot = format!("{local}@localhost");
            assert!(matches!(v.validate_username(&no_dot), Err(ValidationError::InvalidFormat(_))));
        }
    }

    #[test]
    fn password_rules() {
        let v = FieldValidator::default();
        assert_eq!(v.validate_password(""), Err(ValidationError::EmptyField(FieldKind::Password)));
        assert_eq!(
            v.validate_password("12345"),
            Err(ValidationError::TooShort { field: FieldKind::Password, min: 6 })
        );
        for len in 6..40 {
            assert_eq!(v.validate_password(&"x".repeat(len)), Ok(()));
        }
        // whitespace counts, the password is not trimmed
        assert_eq!(v.validate_password("      "), Ok(()));
    }

    #[test]
    fn messages_match_form_copy() {
        assert_eq!(
            ValidationError::EmptyField(FieldKind::Username).to_string(),
            "Please provide a valid username."
        );
        assert_eq!(
            ValidationError::EmptyField(FieldKind::Password).to_string(),
            "Please provide a valid password."
        );
        assert_eq!(
            ValidationError::InvalidFormat(FieldKind::Username).to_string(),
            "Please provide a valid email address."
        );
        assert_eq!(
            ValidationError::TooShort { field: FieldKind::Password, min: 6 }.to_string(),
            "Password must be at least 6 characters long."
        );
    }

    #[test]
    fn form_validation_reports_both_fields() {
        let v = FieldValidator::default();
        let res = v.validate_form("", "abc");
        assert!(!res.is_valid());
        assert_eq!(res.get(FieldKind::Username).as_ref().unwrap_err().code(), 1001);
        assert_eq!(res.get(FieldKind::Password).as_ref().unwrap_err().code(), 1003);

        assert!(v.validate_form("a@b.com", "secret").is_valid());
    }

    #[test]
    fn custom_minimum_length() {
        let v = FieldValidator::new(8);
        assert!(v.validate_password("secret").is_err());
        assert!(v.validate_password("secret12").is_ok());
        assert_eq!(v.min_password_len(), 8);
    }
}
