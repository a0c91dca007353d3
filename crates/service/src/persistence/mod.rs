//! Remembered credentials and form drafts.
//!
//! Both records share the `{username, userType, timestamp}` layout and the
//! same fail-soft load rules, implemented once in [`record_store`]. They
//! differ in storage scope, retention window, and the draft's debounce.

pub mod credentials;
pub mod draft;
pub mod record_store;

pub use credentials::CredentialStore;
pub use draft::DraftStore;
pub use record_store::RecordStore;
