//! The login form context: validation, presentation, persistence and the
//! submission state machine behind one event-driven entry point.

pub mod controller;
pub mod events;
pub mod settings;

pub use controller::{FormDeps, LoginForm, SubmitOutcome};
pub use events::{FormEvent, Key};
pub use settings::FormSettings;
