//! Plain data types shared by the login form service and its adapters.

pub mod errors;
pub mod form_state;
pub mod login_record;
pub mod user_type;

pub use form_state::{FieldKind, FieldState, FormState, SubmissionPhase, Validity};
pub use login_record::{CredentialRecord, DraftRecord, LoginRecord};
pub use user_type::UserType;
