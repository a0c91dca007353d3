use std::sync::Arc;

use models::{FieldKind, FormState, SubmissionPhase, UserType, Validity};
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::form::events::{FormEvent, Key};
use crate::form::settings::FormSettings;
use crate::persistence::{CredentialStore, DraftStore, RecordStore};
use crate::presentation::{Notification, Notifier, PresentationBinder, PresentationPort, SocialProvider};
use crate::scheduler::{DeferredTask, Fired, Scheduler, TimerHandle};
use crate::storage::KeyValueStorage;
use crate::validation::{is_valid_email, FieldValidator};

/// Collaborators a form is wired to at startup.
#[derive(Clone)]
pub struct FormDeps {
    pub presentation: Arc<dyn PresentationPort>,
    pub notifier: Arc<dyn Notifier>,
    pub scheduler: Arc<dyn Scheduler>,
    pub clock: Arc<dyn Clock>,
    /// Persistent scope (remembered credentials).
    pub local_storage: Arc<dyn KeyValueStorage>,
    /// Session scope (drafts).
    pub session_storage: Arc<dyn KeyValueStorage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// At least one field failed; errors are shown inline.
    Rejected,
    /// Simulated login call started.
    Accepted,
    /// A submission is already in flight.
    Ignored,
}

/// Snapshot of the form taken when a submission is accepted.
#[derive(Debug, Clone)]
struct SubmissionRequest {
    handle: TimerHandle,
    username: String,
    user_type: UserType,
    remember_me: bool,
}

/// The whole login form context. One instance per page, driven from a
/// single dispatch loop through [`LoginForm::handle`] and [`LoginForm::fire`].
pub struct LoginForm {
    settings: FormSettings,
    validator: FieldValidator,
    binder: PresentationBinder,
    notifier: Arc<dyn Notifier>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    credentials: CredentialStore,
    draft: DraftStore,
    state: FormState,
    in_flight: Option<SubmissionRequest>,
    ready_at_ms: Option<i64>,
}

impl LoginForm {
    pub fn new(settings: FormSettings, deps: FormDeps) -> Self {
        let credentials = CredentialStore::new(RecordStore::new(
            deps.local_storage,
            settings.credentials_key.clone(),
            settings.credential_retention,
            deps.clock.clone(),
        ));
        let draft = DraftStore::new(
            RecordStore::new(
                deps.session_storage,
                settings.draft_key.clone(),
                settings.draft_retention,
                deps.clock.clone(),
            ),
            deps.scheduler.clone(),
            settings.draft_debounce,
        );
        Self {
            validator: FieldValidator::new(settings.min_password_len),
            binder: PresentationBinder::new(deps.presentation),
            notifier: deps.notifier,
            scheduler: deps.scheduler,
            clock: deps.clock,
            credentials,
            draft,
            state: FormState::default(),
            in_flight: None,
            ready_at_ms: None,
            settings,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn binder(&self) -> &PresentationBinder {
        &self.binder
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Dispatch one UI event.
    pub async fn handle(&mut self, event: FormEvent) {
        match event {
            FormEvent::PageReady => self.page_ready().await,
            FormEvent::Input { field, value } => self.input(field, value),
            FormEvent::Blur(field) => {
                self.blur(field);
            }
            FormEvent::UserTypeChanged(user_type) => self.change_user_type(user_type),
            FormEvent::RememberMeChanged(checked) => self.set_remember_me(checked).await,
            FormEvent::Submit => {
                self.submit();
            }
            FormEvent::KeyPressed { key, focus } => self.key_pressed(key, focus),
            FormEvent::TogglePasswordVisibility => self.toggle_password_visibility(),
            FormEvent::SocialLogin(provider) => self.social_login(provider),
            FormEvent::ForgotPassword { email } => self.forgot_password(email.as_deref()),
            FormEvent::SupportRequested => self.notifier.notify(&Notification::SupportOptions),
        }
    }

    /// Run a timer that elapsed.
    pub async fn fire(&mut self, fired: Fired) {
        match fired.task {
            DeferredTask::FlushDraft => match self.draft.flush(fired.handle).await {
                Ok(Some(rec)) => debug!(user_type = %rec.user_type, "draft_saved"),
                Ok(None) => {}
                Err(e) => warn!(code = e.code(), error = %e, "draft write failed"),
            },
            DeferredTask::CompleteSubmission => self.complete_submission(fired.handle).await,
        }
    }

    /// Startup: tabs, then remembered credentials, then the draft. The draft
    /// only fills an empty username, so remembered credentials take precedence.
    pub async fn page_ready(&mut self) {
        self.ready_at_ms = Some(self.clock.now_ms());
        self.apply_user_type(self.state.user_type);
        let restored = self.restore_credentials().await;
        let drafted = self.restore_draft().await;
        self.binder.port().focus(FieldKind::Username);
        info!(event = "page_ready", restored, drafted, "login form ready");
    }

    /// Returns whether a remembered login was applied.
    pub async fn restore_credentials(&mut self) -> bool {
        let Some(rec) = self.credentials.load().await else { return false };
        self.state.username = rec.username.clone();
        self.state.user_type = rec.user_type;
        self.state.remember_me = true;
        self.binder.back_fill(&rec.username, rec.user_type);
        self.binder.port().set_remember_me(true);
        self.binder.port().set_username_placeholder(rec.user_type.username_placeholder());
        true
    }

    /// Returns whether a draft was applied.
    pub async fn restore_draft(&mut self) -> bool {
        if !self.state.username.is_empty() {
            debug!("username already filled; draft not applied");
            return false;
        }
        let Some(rec) = self.draft.load().await else { return false };
        self.state.username = rec.username.clone();
        self.state.user_type = rec.user_type;
        self.binder.back_fill(&rec.username, rec.user_type);
        self.binder.port().set_username_placeholder(rec.user_type.username_placeholder());
        true
    }

    /// Typing clears feedback without re-validating; username edits are
    /// also queued as a draft.
    pub fn input(&mut self, field: FieldKind, value: String) {
        self.state.set_value(field, value);
        self.state.set_validity(field, Validity::Unset);
        self.binder.clear(field);
        if field == FieldKind::Username {
            self.queue_draft();
        }
    }

    /// Validate one field and show the verdict. Returns whether it passed.
    pub fn blur(&mut self, field: FieldKind) -> bool {
        let result = self.validator.validate(field, self.state.value(field));
        let ok = result.is_ok();
        self.state.set_validity(field, if ok { Validity::Valid } else { Validity::Invalid });
        self.binder.apply_result(field, &result);
        ok
    }

    pub fn change_user_type(&mut self, user_type: UserType) {
        self.state.user_type = user_type;
        self.apply_user_type(user_type);
        self.queue_draft();
    }

    /// Unchecking forgets the remembered login right away.
    pub async fn set_remember_me(&mut self, checked: bool) {
        self.state.remember_me = checked;
        if !checked {
            if let Err(e) = self.credentials.clear().await {
                warn!(code = e.code(), error = %e, "failed to forget credentials");
            }
        }
    }

    /// Idle -> Validating -> Idle (invalid) or Submitting (valid).
    #[instrument(skip(self), fields(user_type = %self.state.user_type))]
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.state.phase == SubmissionPhase::Submitting {
            debug!("submission already in flight");
            return SubmitOutcome::Ignored;
        }
        if let Some(ready) = self.ready_at_ms {
            debug!(completion_ms = self.clock.now_ms().saturating_sub(ready), "form_completion_time");
        }

        self.state.phase = SubmissionPhase::Validating;
        let verdict = self.validator.validate_form(&self.state.username, &self.state.password);
        for field in FieldKind::ALL {
            let result = verdict.get(field);
            self.state.set_validity(field, if result.is_ok() { Validity::Valid } else { Validity::Invalid });
            self.binder.apply_result(field, result);
        }
        if !verdict.is_valid() {
            self.state.phase = SubmissionPhase::Idle;
            info!(event = "submit_rejected", "login form has invalid fields");
            return SubmitOutcome::Rejected;
        }

        self.state.loading = true;
        self.binder.port().set_loading(true);
        let handle = self.scheduler.after(self.settings.submit_delay, DeferredTask::CompleteSubmission);
        self.in_flight = Some(SubmissionRequest {
            handle,
            username: self.state.username.trim().to_string(),
            user_type: self.state.user_type,
            remember_me: self.state.remember_me,
        });
        self.state.phase = SubmissionPhase::Submitting;
        info!(event = "submit_started", timer = handle.id(), "simulated login started");
        SubmitOutcome::Accepted
    }

    /// End of the simulated call. Always succeeds.
    #[instrument(skip(self), fields(timer = handle.id()))]
    async fn complete_submission(&mut self, handle: TimerHandle) {
        let request = match self.in_flight.take() {
            Some(r) if r.handle == handle => r,
            other => {
                self.in_flight = other;
                debug!("stale submission timer ignored");
                return;
            }
        };

        self.state.loading = false;
        self.binder.port().set_loading(false);

        if request.remember_me {
            if let Err(e) = self.credentials.save(&request.username, request.user_type).await {
                warn!(code = e.code(), error = %e, "failed to remember credentials");
            }
        } else if let Err(e) = self.credentials.clear().await {
            warn!(code = e.code(), error = %e, "failed to forget credentials");
        }
        if let Err(e) = self.draft.clear().await {
            warn!(code = e.code(), error = %e, "failed to clear draft");
        }

        self.state.phase = SubmissionPhase::Idle;
        info!(event = "login_succeeded", user_type = %request.user_type, remember_me = request.remember_me, "login completed");
        self.notifier.notify(&Notification::LoginSucceeded {
            username: request.username,
            user_type: request.user_type,
        });
    }

    /// Enter moves from username to password, Enter on password submits,
    /// Escape clears the form.
    pub fn key_pressed(&mut self, key: Key, focus: Option<FieldKind>) {
        match (key, focus) {
            (Key::Enter, Some(FieldKind::Username)) => self.binder.port().focus(FieldKind::Password),
            (Key::Enter, Some(FieldKind::Password)) => {
                self.submit();
            }
            (Key::Enter, None) => {}
            (Key::Escape, _) => self.clear_form(),
        }
    }

    /// Reset values, remember-me and user type; all fields neutral.
    /// Stored records and an in-flight submission are left alone.
    pub fn clear_form(&mut self) {
        self.state.reset();
        let port = self.binder.port().clone();
        for field in FieldKind::ALL {
            port.set_field_value(field, "");
        }
        port.set_remember_me(false);
        self.binder.clear_all();
        self.apply_user_type(UserType::default());
        port.focus(FieldKind::Username);
    }

    pub fn toggle_password_visibility(&mut self) {
        self.state.password_visible = !self.state.password_visible;
        self.binder.port().set_password_visible(self.state.password_visible);
    }

    pub fn social_login(&self, provider: SocialProvider) {
        info!(event = "social_login", provider = provider.name(), "social login requested");
        self.notifier.notify(&Notification::SocialLogin(provider));
    }

    /// A dismissed prompt (`None` or empty) does nothing.
    pub fn forgot_password(&self, email: Option<&str>) {
        let Some(email) = email.filter(|e| !e.is_empty()) else { return };
        if is_valid_email(email) {
            self.notifier.notify(&Notification::PasswordResetSent { email: email.to_string() });
        } else {
            self.notifier.notify(&Notification::InvalidResetEmail);
        }
    }

    fn apply_user_type(&mut self, user_type: UserType) {
        self.binder.select_tab(user_type);
        self.binder.port().set_username_placeholder(user_type.username_placeholder());
    }

    fn queue_draft(&mut self) {
        self.draft.save(&self.state.username, self.state.user_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::presentation::mock::{RecordingNotifier, RecordingPresentation};
    use crate::scheduler::ManualScheduler;
    use crate::storage::JsonMapStore;
    use models::FieldState;

    struct Harness {
        form: LoginForm,
        port: Arc<RecordingPresentation>,
        notifier: Arc<RecordingNotifier>,
        sched: ManualScheduler,
    }

    fn harness() -> Harness {
        let sched = ManualScheduler::new(ManualClock::new(1_000_000));
        let port = Arc::new(RecordingPresentation::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let deps = FormDeps {
            presentation: port.clone(),
            notifier: notifier.clone(),
            scheduler: Arc::new(sched.clone()),
            clock: Arc::new(sched.clock()),
            local_storage: JsonMapStore::in_memory(),
            session_storage: JsonMapStore::in_memory(),
        };
        Harness { form: LoginForm::new(FormSettings::default(), deps), port, notifier, sched }
    }

    #[tokio::test]
    async fn blur_validates_and_input_only_clears() {
        let mut h = harness();
        h.form.handle(FormEvent::Blur(FieldKind::Password)).await;
        assert_eq!(
            h.port.snapshot().password_state,
            FieldState::Error("Please provide a valid password.".into())
        );
        assert_eq!(h.form.state().password_validity, Validity::Invalid);

        h.form.handle(FormEvent::Input { field: FieldKind::Password, value: "abc".into() }).await;
        assert_eq!(h.port.snapshot().password_state, FieldState::Neutral);
        assert_eq!(h.form.state().password_validity, Validity::Unset);
    }

    #[tokio::test]
    async fn password_input_does_not_queue_a_draft() {
        let mut h = harness();
        h.form.handle(FormEvent::Input { field: FieldKind::Password, value: "secret".into() }).await;
        assert_eq!(h.sched.pending_count(), 0);
        h.form.handle(FormEvent::Input { field: FieldKind::Username, value: "a".into() }).await;
        assert_eq!(h.sched.pending_count(), 1);
    }

    #[tokio::test]
    async fn invalid_submit_returns_to_idle_with_both_errors() {
        let mut h = harness();
        assert_eq!(h.form.submit(), SubmitOutcome::Rejected);
        let form = h.port.snapshot();
        assert!(matches!(form.username_state, FieldState::Error(_)));
        assert!(matches!(form.password_state, FieldState::Error(_)));
        assert_eq!(h.form.state().phase, SubmissionPhase::Idle);
        assert!(form.loading_history.is_empty());
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_ignored() {
        let mut h = harness();
        h.form.input(FieldKind::Username, "a@b.com".into());
        h.form.input(FieldKind::Password, "secret".into());
        assert_eq!(h.form.submit(), SubmitOutcome::Accepted);
        assert_eq!(h.form.submit(), SubmitOutcome::Ignored);
        assert!(h.port.snapshot().loading);
    }

    #[tokio::test]
    async fn escape_mid_submit_keeps_the_login_in_flight() {
        let mut h = harness();
        h.form.input(FieldKind::Username, "a@b.com".into());
        h.form.input(FieldKind::Password, "secret".into());
        assert_eq!(h.form.submit(), SubmitOutcome::Accepted);

        h.form.handle(FormEvent::KeyPressed { key: Key::Escape, focus: None }).await;
        assert_eq!(h.form.state().phase, SubmissionPhase::Submitting);
        assert!(h.form.state().loading);
        assert!(h.port.snapshot().loading);

        h.form.input(FieldKind::Username, "c@d.com".into());
        h.form.input(FieldKind::Password, "secret".into());
        assert_eq!(h.form.submit(), SubmitOutcome::Ignored);

        while let Some(fired) = h.sched.pop_due(i64::MAX) {
            h.form.fire(fired).await;
        }
        assert_eq!(
            h.notifier.notifications(),
            vec![Notification::LoginSucceeded { username: "a@b.com".into(), user_type: UserType::Employee }]
        );
        assert_eq!(h.form.state().phase, SubmissionPhase::Idle);
        assert!(!h.port.snapshot().loading);
    }

    #[tokio::test]
    async fn enter_navigation_and_escape_reset() {
        let mut h = harness();
        h.form.handle(FormEvent::KeyPressed { key: Key::Enter, focus: Some(FieldKind::Username) }).await;
        assert_eq!(h.port.snapshot().focused, Some(FieldKind::Password));

        h.form.change_user_type(UserType::Client);
        h.form.input(FieldKind::Username, "x@y.com".into());
        h.form.set_remember_me(true).await;
        h.form.blur(FieldKind::Username);

        h.form.handle(FormEvent::KeyPressed { key: Key::Escape, focus: None }).await;
        let form = h.port.snapshot();
        assert_eq!(form.username, "");
        assert!(!form.remember_me);
        assert_eq!(form.active_tab_labels(), vec![UserType::Employee]);
        assert_eq!(form.username_state, FieldState::Neutral);
        assert_eq!(form.focused, Some(FieldKind::Username));
        assert_eq!(form.placeholder, "employee@company.com");
        assert!(h.form.state().username.is_empty());
    }

    #[tokio::test]
    async fn enter_on_password_submits() {
        let mut h = harness();
        h.form.handle(FormEvent::KeyPressed { key: Key::Enter, focus: Some(FieldKind::Password) }).await;
        assert!(matches!(h.port.snapshot().username_state, FieldState::Error(_)));
    }

    #[tokio::test]
    async fn stub_handlers_notify() {
        let mut h = harness();
        h.form.handle(FormEvent::SocialLogin(SocialProvider::Google)).await;
        h.form.handle(FormEvent::ForgotPassword { email: None }).await;
        h.form.handle(FormEvent::ForgotPassword { email: Some("nope".into()) }).await;
        h.form.handle(FormEvent::ForgotPassword { email: Some("me@x.org".into()) }).await;
        h.form.handle(FormEvent::SupportRequested).await;
        assert_eq!(
            h.notifier.notifications(),
            vec![
                Notification::SocialLogin(SocialProvider::Google),
                Notification::InvalidResetEmail,
                Notification::PasswordResetSent { email: "me@x.org".into() },
                Notification::SupportOptions,
            ]
        );
    }

    #[tokio::test]
    async fn toggle_password_visibility_flips() {
        let mut h = harness();
        h.form.handle(FormEvent::TogglePasswordVisibility).await;
        assert!(h.port.snapshot().password_visible);
        h.form.handle(FormEvent::TogglePasswordVisibility).await;
        assert!(!h.port.snapshot().password_visible);
    }

    #[tokio::test]
    async fn user_type_change_updates_placeholder() {
        let mut h = harness();
        h.form.handle(FormEvent::UserTypeChanged(UserType::Client)).await;
        let form = h.port.snapshot();
        assert_eq!(form.placeholder, "client@example.com");
        assert_eq!(form.active_tab_labels(), vec![UserType::Client]);
    }
}
