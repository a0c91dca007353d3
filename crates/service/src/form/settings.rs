use std::time::Duration;

use configs::AppConfig;

use crate::persistence::credentials::{CREDENTIALS_KEY, CREDENTIAL_RETENTION};
use crate::persistence::draft::{DRAFT_DEBOUNCE, DRAFT_KEY, DRAFT_RETENTION};
use crate::validation::DEFAULT_MIN_PASSWORD_LEN;

pub const SUBMIT_DELAY: Duration = Duration::from_secs(2);

/// Tunables for one form instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSettings {
    pub credentials_key: String,
    pub draft_key: String,
    pub credential_retention: Duration,
    pub draft_retention: Duration,
    pub draft_debounce: Duration,
    pub submit_delay: Duration,
    pub min_password_len: usize,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            credentials_key: CREDENTIALS_KEY.to_string(),
            draft_key: DRAFT_KEY.to_string(),
            credential_retention: CREDENTIAL_RETENTION,
            draft_retention: DRAFT_RETENTION,
            draft_debounce: DRAFT_DEBOUNCE,
            submit_delay: SUBMIT_DELAY,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl From<&AppConfig> for FormSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            credentials_key: cfg.storage.credentials_key.clone(),
            draft_key: cfg.storage.draft_key.clone(),
            credential_retention: cfg.form.credential_retention(),
            draft_retention: cfg.form.draft_retention(),
            draft_debounce: cfg.form.draft_debounce(),
            submit_delay: cfg.form.submit_delay(),
            min_password_len: cfg.form.min_password_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_built_in_defaults() {
        assert_eq!(FormSettings::from(&AppConfig::default()), FormSettings::default());
    }
}
