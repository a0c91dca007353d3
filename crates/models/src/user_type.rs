use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Audience selected through the tab strip above the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Employee,
    Client,
}

impl UserType {
    /// Every tab, in display order.
    pub const ALL: [UserType; 2] = [UserType::Employee, UserType::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Employee => "employee",
            UserType::Client => "client",
        }
    }

    /// Example address shown in the empty username field.
    pub fn username_placeholder(&self) -> &'static str {
        match self {
            UserType::Employee => "employee@company.com",
            UserType::Client => "client@example.com",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(UserType::Employee),
            "client" => Ok(UserType::Client),
            other => Err(ModelError::UnknownUserType(other.to_string())),
        }
    }
}
