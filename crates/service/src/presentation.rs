//! Presentation ports and the binder that drives them.
//!
//! The form core never touches a concrete UI. It talks to a
//! [`PresentationPort`] for visual state and a [`Notifier`] for modal
//! messages; adapters (terminal, browser, tests) implement both.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use models::{FieldKind, FieldState, UserType};

use crate::validation::FieldResult;

/// Visual surface of the login form.
pub trait PresentationPort: Send + Sync {
    fn set_field_state(&self, field: FieldKind, state: &FieldState);
    fn set_field_value(&self, field: FieldKind, value: &str);
    /// Toggle the "active" indicator of one tab label.
    fn set_active_tab(&self, tab: UserType, active: bool);
    /// Check the radio input of a user type.
    fn set_user_type(&self, user_type: UserType);
    fn set_remember_me(&self, checked: bool);
    fn set_loading(&self, loading: bool);
    fn set_username_placeholder(&self, placeholder: &str);
    fn set_password_visible(&self, visible: bool);
    fn focus(&self, field: FieldKind);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl SocialProvider {
    pub fn name(&self) -> &'static str {
        match self {
            SocialProvider::Google => "Google",
            SocialProvider::Facebook => "Facebook",
        }
    }

    fn flow(&self) -> &'static str {
        match self {
            SocialProvider::Google => "Google OAuth flow",
            SocialProvider::Facebook => "Facebook Login flow",
        }
    }
}

pub const SUPPORT_OPTIONS: [&str; 4] = [
    "Call Support: +1-800-CAOA-HELP",
    "Live Chat: Available 24/7",
    "Email: support@caoasoftware.com",
    "Help Center: Browse our knowledge base",
];

/// Modal messages. `Display` renders the dialog text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    LoginSucceeded { username: String, user_type: UserType },
    SocialLogin(SocialProvider),
    PasswordResetSent { email: String },
    InvalidResetEmail,
    SupportOptions,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::LoginSucceeded { username, user_type } => {
                write!(f, "Login successful!\n\nUser Type: {user_type}\nUsername: {username}")
            }
            Notification::SocialLogin(p) => write!(
                f,
                "{} login functionality would be implemented here.\n\nThis would redirect to {}.",
                p.name(),
                p.flow()
            ),
            Notification::PasswordResetSent { email } => {
                write!(f, "Password reset instructions have been sent to {email}")
            }
            Notification::InvalidResetEmail => f.write_str("Please enter a valid email address."),
            Notification::SupportOptions => {
                write!(f, "CAOA Support Options:\n\n{}", SUPPORT_OPTIONS.join("\n\n"))
            }
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Maps validation results and tab selection onto the presentation port,
/// remembering what each field currently shows.
pub struct PresentationBinder {
    port: Arc<dyn PresentationPort>,
    fields: HashMap<FieldKind, FieldState>,
    active_tab: UserType,
}

impl PresentationBinder {
    pub fn new(port: Arc<dyn PresentationPort>) -> Self {
        Self { port, fields: HashMap::new(), active_tab: UserType::default() }
    }

    pub fn port(&self) -> &Arc<dyn PresentationPort> {
        &self.port
    }

    pub fn field_state(&self, field: FieldKind) -> FieldState {
        self.fields.get(&field).cloned().unwrap_or_default()
    }

    pub fn active_tab(&self) -> UserType {
        self.active_tab
    }

    /// Success on `Ok`, error plus message on `Err`.
    pub fn apply_result(&mut self, field: FieldKind, result: &FieldResult) {
        let state = match result {
            Ok(()) => FieldState::Success,
            Err(e) => FieldState::Error(e.to_string()),
        };
        self.set(field, state);
    }

    /// Back to neutral.
    pub fn clear(&mut self, field: FieldKind) {
        self.set(field, FieldState::Neutral);
    }

    pub fn clear_all(&mut self) {
        for field in FieldKind::ALL {
            self.clear(field);
        }
    }

    /// Check `user_type` and leave exactly its label active.
    pub fn select_tab(&mut self, user_type: UserType) {
        self.active_tab = user_type;
        self.port.set_user_type(user_type);
        for tab in UserType::ALL {
            self.port.set_active_tab(tab, false);
        }
        self.port.set_active_tab(user_type, true);
    }

    /// Put a restored username and user type back into the form.
    pub fn back_fill(&mut self, username: &str, user_type: UserType) {
        self.port.set_field_value(FieldKind::Username, username);
        self.select_tab(user_type);
    }

    fn set(&mut self, field: FieldKind, state: FieldState) {
        self.port.set_field_state(field, &state);
        self.fields.insert(field, state);
    }
}

/// In-memory port and notifier that record everything for assertions.
pub mod mock {
    use super::*;
    use crate::scheduler::lock;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct RenderedForm {
        pub username: String,
        pub password: String,
        pub username_state: FieldState,
        pub password_state: FieldState,
        pub active_tabs: HashMap<UserType, bool>,
        pub checked_user_type: Option<UserType>,
        pub remember_me: bool,
        pub loading: bool,
        pub placeholder: String,
        pub password_visible: bool,
        pub focused: Option<FieldKind>,
        /// Every loading flag written, in order.
        pub loading_history: Vec<bool>,
    }

    impl RenderedForm {
        pub fn active_tab_labels(&self) -> Vec<UserType> {
            UserType::ALL
                .into_iter()
                .filter(|t| self.active_tabs.get(t).copied().unwrap_or(false))
                .collect()
        }

        pub fn field_state(&self, field: FieldKind) -> &FieldState {
            match field {
                FieldKind::Username => &self.username_state,
                FieldKind::Password => &self.password_state,
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingPresentation {
        form: Mutex<RenderedForm>,
    }

    impl RecordingPresentation {
        pub fn snapshot(&self) -> RenderedForm {
            lock(&self.form).clone()
        }
    }

    impl PresentationPort for RecordingPresentation {
        fn set_field_state(&self, field: FieldKind, state: &FieldState) {
            let mut form = lock(&self.form);
            match field {
                FieldKind::Username => form.username_state = state.clone(),
                FieldKind::Password => form.password_state = state.clone(),
            }
        }

        fn set_field_value(&self, field: FieldKind, value: &str) {
            let mut form = lock(&self.form);
            match field {
                FieldKind::Username => form.username = value.to_string(),
                FieldKind::Password => form.password = value.to_string(),
            }
        }

        fn set_active_tab(&self, tab: UserType, active: bool) {
            lock(&self.form).active_tabs.insert(tab, active);
        }

        fn set_user_type(&self, user_type: UserType) {
            lock(&self.form).checked_user_type = Some(user_type);
        }

        fn set_remember_me(&self, checked: bool) {
            lock(&self.form).remember_me = checked;
        }

        fn set_loading(&self, loading: bool) {
            let mut form = lock(&self.form);
            form.loading = loading;
            form.loading_history.push(loading);
        }

        fn set_username_placeholder(&self, placeholder: &str) {
            lock(&self.form).placeholder = placeholder.to_string();
        }

        fn set_password_visible(&self, visible: bool) {
            lock(&self.form).password_visible = visible;
        }

        fn focus(&self, field: FieldKind) {
            lock(&self.form).focused = Some(field);
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn notifications(&self) -> Vec<Notification> {
            lock(&self.seen).clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: &Notification) {
            lock(&self.seen).push(notification.clone());
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn recorders_survive_a_panicked_holder() {
            let port = Arc::new(RecordingPresentation::default());
            let notifier = Arc::new(RecordingNotifier::default());
            let (p, n) = (port.clone(), notifier.clone());
            let joined = std::thread::spawn(move || {
                let _form = p.form.lock().unwrap();
                let _seen = n.seen.lock().unwrap();
                panic!("assertion failed while recording");
            })
            .join();
            assert!(joined.is_err());
            assert!(port.form.is_poisoned());
            assert!(notifier.seen.is_poisoned());

            port.set_loading(true);
            port.set_field_value(FieldKind::Username, "a@b.com");
            notifier.notify(&Notification::SupportOptions);

            let form = port.snapshot();
            assert!(form.loading);
            assert_eq!(form.username, "a@b.com");
            assert_eq!(notifier.notifications(), vec![Notification::SupportOptions]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::RecordingPresentation;
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn apply_result_sets_success_or_error_message() {
        let port = Arc::new(RecordingPresentation::default());
        let mut binder = PresentationBinder::new(port.clone());

        binder.apply_result(FieldKind::Username, &Err(ValidationError::InvalidFormat(FieldKind::Username)));
        assert_eq!(
            port.snapshot().username_state,
            FieldState::Error("Please provide a valid email address.".into())
        );

        binder.apply_result(FieldKind::Username, &Ok(()));
        assert_eq!(binder.field_state(FieldKind::Username), FieldState::Success);

        binder.clear(FieldKind::Username);
        assert_eq!(port.snapshot().username_state, FieldState::Neutral);
        assert_eq!(binder.field_state(FieldKind::Password), FieldState::Neutral);
    }

    #[test]
    fn exactly_one_tab_is_active_after_any_selection() {
        let port = Arc::new(RecordingPresentation::default());
        let mut binder = PresentationBinder::new(port.clone());
        for ut in [UserType::Client, UserType::Employee, UserType::Employee, UserType::Client] {
            binder.select_tab(ut);
            let form = port.snapshot();
            assert_eq!(form.active_tab_labels(), vec![ut]);
            assert_eq!(form.checked_user_type, Some(ut));
            assert_eq!(binder.active_tab(), ut);
        }
    }

    #[test]
    fn notification_texts() {
        let n = Notification::LoginSucceeded { username: "a@b.com".into(), user_type: UserType::Client };
        assert_eq!(n.to_string(), "Login successful!\n\nUser Type: client\nUsername: a@b.com");
        assert!(Notification::SocialLogin(SocialProvider::Facebook)
            .to_string()
            .contains("Facebook Login flow"));
        assert!(Notification::SupportOptions.to_string().starts_with("CAOA Support Options:"));
    }
}
