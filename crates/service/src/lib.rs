//! Headless core of the CAOA login form.
//! - Pure field validation (`validation`)
//! - Presentation ports and binder (`presentation`)
//! - Remembered credentials and debounced drafts (`persistence`, `storage`)
//! - Injected time (`clock`, `scheduler`)
//! - The event-driven form context and submission state machine (`form`)

pub mod clock;
pub mod errors;
pub mod form;
pub mod persistence;
pub mod presentation;
pub mod scheduler;
pub mod storage;
pub mod validation;

pub use form::{FormDeps, FormEvent, FormSettings, LoginForm, SubmitOutcome};
