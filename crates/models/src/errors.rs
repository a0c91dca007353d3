use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unknown user type: {0}")]
    UnknownUserType(String),
}

impl ModelError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ModelError::Validation(_) => 2001,
            ModelError::UnknownUserType(_) => 2002,
        }
    }
}
