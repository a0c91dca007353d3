use std::fmt;

use serde::{Deserialize, Serialize};

use crate::user_type::UserType;

/// Inputs that carry validation feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Username,
    Password,
}

impl FieldKind {
    pub const ALL: [FieldKind; 2] = [FieldKind::Username, FieldKind::Password];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Username => "username",
            FieldKind::Password => "password",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual state of a form group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Neutral,
    Error(String),
    Success,
}

/// Outcome of the last validation run for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Unset,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
}

/// Transient state of the form; never persisted as a whole.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub username: String,
    pub password: String,
    pub user_type: UserType,
    pub remember_me: bool,
    pub username_validity: Validity,
    pub password_validity: Validity,
    pub loading: bool,
    pub phase: SubmissionPhase,
    pub password_visible: bool,
}

impl FormState {
    pub fn value(&self, field: FieldKind) -> &str {
        match field {
            FieldKind::Username => &self.username,
            FieldKind::Password => &self.password,
        }
    }

    pub fn set_value(&mut self, field: FieldKind, value: String) {
        match field {
            FieldKind::Username => self.username = value,
            FieldKind::Password => self.password = value,
        }
    }

    pub fn validity(&self, field: FieldKind) -> Validity {
        match field {
            FieldKind::Username => self.username_validity,
            FieldKind::Password => self.password_validity,
        }
    }

    pub fn set_validity(&mut self, field: FieldKind, validity: Validity) {
        match field {
            FieldKind::Username => self.username_validity = validity,
            FieldKind::Password => self.password_validity = validity,
        }
    }

    /// Back to the initial form: empty values, employee tab, nothing remembered.
    /// Submission progress and password visibility are kept.
    pub fn reset(&mut self) {
        *self = FormState {
            password_visible: self.password_visible,
            loading: self.loading,
            phase: self.phase,
            ..FormState::default()
        };
    }
}
