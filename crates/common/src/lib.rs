//! Shared runtime helpers for the login form workspace.
//! - Logging initialization (`utils::logging`)
//! - Startup environment checks (`env`)

pub mod env;
pub mod utils;
