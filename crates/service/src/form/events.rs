use models::{FieldKind, UserType};

use crate::presentation::SocialProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
}

/// UI events the form subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Page finished loading; restores remembered data.
    PageReady,
    Input { field: FieldKind, value: String },
    Blur(FieldKind),
    UserTypeChanged(UserType),
    RememberMeChanged(bool),
    Submit,
    KeyPressed { key: Key, focus: Option<FieldKind> },
    TogglePasswordVisibility,
    SocialLogin(SocialProvider),
    /// Answer to the reset prompt; `None` when the prompt was dismissed.
    ForgotPassword { email: Option<String> },
    SupportRequested,
}
