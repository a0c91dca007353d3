use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_credentials_key")]
    pub credentials_key: String,
    #[serde(default = "default_draft_key")]
    pub draft_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            credentials_key: default_credentials_key(),
            draft_key: default_draft_key(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    #[serde(default = "default_credential_retention_days")]
    pub credential_retention_days: u64,
    #[serde(default = "default_draft_retention_minutes")]
    pub draft_retention_minutes: u64,
    #[serde(default = "default_draft_debounce_ms")]
    pub draft_debounce_ms: u64,
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            credential_retention_days: default_credential_retention_days(),
            draft_retention_minutes: default_draft_retention_minutes(),
            draft_debounce_ms: default_draft_debounce_ms(),
            submit_delay_ms: default_submit_delay_ms(),
            min_password_len: default_min_password_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

/// Upper bound for retention windows; keeps the second/millisecond
/// conversions far from `u64`/`i64` overflow.
pub const MAX_RETENTION_DAYS: u64 = 100 * 365;

fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_credentials_key() -> String { "caoa_credentials".into() }
fn default_draft_key() -> String { "caoa_form_draft".into() }
fn default_credential_retention_days() -> u64 { 30 }
fn default_draft_retention_minutes() -> u64 { 60 }
fn default_draft_debounce_ms() -> u64 { 1000 }
fn default_submit_delay_ms() -> u64 { 2000 }
fn default_min_password_len() -> usize { 6 }

/// Load from `CONFIG_PATH` (default `config.toml`); a missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if std::fs::metadata(&path).is_err() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.storage.normalize();
        self.storage.validate()?;
        self.form.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    fn normalize(&mut self) {
        if self.data_dir.as_os_str().is_empty() {
            self.data_dir = default_data_dir();
        }
        if self.credentials_key.trim().is_empty() {
            self.credentials_key = default_credentials_key();
        }
        if self.draft_key.trim().is_empty() {
            self.draft_key = default_draft_key();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.credentials_key == self.draft_key {
            return Err(anyhow!("storage.credentials_key and storage.draft_key must differ"));
        }
        Ok(())
    }

    /// File backing the persistent storage scope.
    pub fn local_storage_path(&self) -> PathBuf {
        self.data_dir.join("local_storage.json")
    }
}

impl FormConfig {
    pub fn validate(&self) -> Result<()> {
        if self.credential_retention_days == 0 || self.draft_retention_minutes == 0 {
            return Err(anyhow!("form retention windows must be positive"));
        }
        if self.draft_debounce_ms == 0 || self.submit_delay_ms == 0 {
            return Err(anyhow!("form.draft_debounce_ms and form.submit_delay_ms must be positive"));
        }
        if self.min_password_len == 0 {
            return Err(anyhow!("form.min_password_len must be >= 1"));
        }
        if self.credential_retention_days > MAX_RETENTION_DAYS {
            return Err(anyhow!("form.credential_retention_days must be <= {MAX_RETENTION_DAYS}"));
        }
        if self.draft_retention_minutes > MAX_RETENTION_DAYS * 24 * 60 {
            return Err(anyhow!("form.draft_retention_minutes must be <= {}", MAX_RETENTION_DAYS * 24 * 60));
        }
        Ok(())
    }

    pub fn credential_retention(&self) -> Duration {
        Duration::from_secs(self.credential_retention_days.saturating_mul(24 * 60 * 60))
    }

    pub fn draft_retention(&self) -> Duration {
        Duration::from_secs(self.draft_retention_minutes.saturating_mul(60))
    }

    pub fn draft_debounce(&self) -> Duration {
        Duration::from_millis(self.draft_debounce_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_login_defaults() -> Result<()> {
        let mut cfg = load_from_str("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.storage.credentials_key, "caoa_credentials");
        assert_eq!(cfg.storage.draft_key, "caoa_form_draft");
        assert_eq!(cfg.form.credential_retention(), Duration::from_secs(30 * 24 * 3600));
        assert_eq!(cfg.form.draft_retention(), Duration::from_secs(3600));
        assert_eq!(cfg.form.draft_debounce(), Duration::from_secs(1));
        assert_eq!(cfg.form.submit_delay(), Duration::from_secs(2));
        assert_eq!(cfg.form.min_password_len, 6);
        assert!(!cfg.logging.json);
        Ok(())
    }

    #[test]
    fn blank_keys_are_normalized() -> Result<()> {
        let mut cfg = load_from_str(
            r#"
            [storage]
            data_dir = "/tmp/caoa"
            credentials_key = "  "
            "#,
        )?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.storage.credentials_key, "caoa_credentials");
        assert_eq!(cfg.storage.local_storage_path(), PathBuf::from("/tmp/caoa/local_storage.json"));
        Ok(())
    }

    #[test]
    fn zero_durations_are_rejected() -> Result<()> {
        let mut cfg = load_from_str("[form]\nsubmit_delay_ms = 0\n")?;
        assert!(cfg.normalize_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn oversized_retention_is_rejected() -> Result<()> {
        let mut cfg = load_from_str("[form]\ncredential_retention_days = 9223372036854775807\n")?;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = load_from_str("[form]\ndraft_retention_minutes = 9223372036854775807\n")?;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = load_from_str(&format!("[form]\ncredential_retention_days = {MAX_RETENTION_DAYS}\n"))?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.form.credential_retention(), Duration::from_secs(MAX_RETENTION_DAYS * 86_400));
        Ok(())
    }

    #[test]
    fn identical_keys_are_rejected() -> Result<()> {
        let mut cfg = load_from_str("[storage]\ncredentials_key = \"k\"\ndraft_key = \"k\"\n")?;
        assert!(cfg.normalize_and_validate().is_err());
        Ok(())
    }
}
