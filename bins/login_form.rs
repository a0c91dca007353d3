use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dotenvy::dotenv;
use models::{FieldKind, FieldState, UserType};
use service::clock::SystemClock;
use service::form::Key;
use service::presentation::{Notification, Notifier, PresentationPort, SocialProvider};
use service::scheduler::TokioScheduler;
use service::storage::JsonMapStore;
use service::{FormDeps, FormEvent, FormSettings, LoginForm};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use uuid::Uuid;

const HELP: &str = "\
commands:
  user <text>         type into the username field
  pass <text>         type into the password field
  blur user|pass      leave a field (validates it)
  tab employee|client switch user type
  remember on|off     toggle remember me
  submit              submit the form
  enter user|pass     press Enter with a field focused
  esc                 press Escape (clears the form)
  show                toggle password visibility
  google | facebook   social login
  forgot [email]      forgot password (no email = prompt dismissed)
  support             live support
  help | quit";

/// Renders form updates as lines on stdout.
#[derive(Default)]
struct TerminalPresentation {
    password_visible: AtomicBool,
}

impl PresentationPort for TerminalPresentation {
    fn set_field_state(&self, field: FieldKind, state: &FieldState) {
        match state {
            FieldState::Neutral => {}
            FieldState::Success => println!("  [{field}] ok"),
            FieldState::Error(msg) => println!("  [{field}] error: {msg}"),
        }
    }

    fn set_field_value(&self, field: FieldKind, value: &str) {
        let shown = if field == FieldKind::Password && !self.password_visible.load(Ordering::Relaxed) {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        println!("  [{field}] = {shown:?}");
    }

    fn set_active_tab(&self, tab: UserType, active: bool) {
        if active {
            let tabs: Vec<String> = UserType::ALL
                .iter()
                .map(|t| if *t == tab { format!("[{t}]") } else { format!(" {t} ") })
                .collect();
            println!("  tabs: {}", tabs.join(" "));
        }
    }

    fn set_user_type(&self, _user_type: UserType) {}

    fn set_remember_me(&self, checked: bool) {
        println!("  [remember me] {}", if checked { "x" } else { " " });
    }

    fn set_loading(&self, loading: bool) {
        println!("  {}", if loading { "logging in..." } else { "[Login]" });
    }

    fn set_username_placeholder(&self, placeholder: &str) {
        println!("  [username] placeholder: {placeholder}");
    }

    fn set_password_visible(&self, visible: bool) {
        self.password_visible.store(visible, Ordering::Relaxed);
        println!("  [password] {}", if visible { "shown" } else { "hidden" });
    }

    fn focus(&self, field: FieldKind) {
        println!("  focus -> {field}");
    }
}

struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) {
        println!("+----------------------------------------");
        for line in notification.to_string().lines() {
            println!("| {line}");
        }
        println!("+----------------------------------------");
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Event(FormEvent),
    Help,
    Quit,
}

fn parse_field(arg: &str) -> Result<FieldKind, String> {
    match arg {
        "user" | "username" => Ok(FieldKind::Username),
        "pass" | "password" => Ok(FieldKind::Password),
        other => Err(format!("unknown field {other:?}")),
    }
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (cmd, arg) = match line.split_once(' ') {
        Some((c, a)) => (c, a),
        None => (line, ""),
    };
    let event = match cmd {
        "user" => FormEvent::Input { field: FieldKind::Username, value: arg.to_string() },
        "pass" => FormEvent::Input { field: FieldKind::Password, value: arg.to_string() },
        "blur" => FormEvent::Blur(parse_field(arg.trim())?),
        "tab" => FormEvent::UserTypeChanged(arg.parse::<UserType>().map_err(|e| e.to_string())?),
        "remember" => match arg.trim() {
            "on" => FormEvent::RememberMeChanged(true),
            "off" => FormEvent::RememberMeChanged(false),
            other => return Err(format!("expected on|off, got {other:?}")),
        },
        "submit" => FormEvent::Submit,
        "enter" => FormEvent::KeyPressed { key: Key::Enter, focus: Some(parse_field(arg.trim())?) },
        "esc" => FormEvent::KeyPressed { key: Key::Escape, focus: None },
        "show" => FormEvent::TogglePasswordVisibility,
        "google" => FormEvent::SocialLogin(SocialProvider::Google),
        "facebook" => FormEvent::SocialLogin(SocialProvider::Facebook),
        "forgot" => {
            let email = arg.trim();
            FormEvent::ForgotPassword { email: (!email.is_empty()).then(|| email.to_string()) }
        }
        "support" => FormEvent::SupportRequested,
        "help" | "" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        other => return Err(format!("unknown command {other:?}; try help")),
    };
    Ok(Command::Event(event))
}

fn init_logging(json: bool) {
    // load .env early so RUST_LOG applies
    dotenv().ok();
    common::utils::logging::init_logging(json);
    info!(service = "login_form", event = "logger_init", "tracing subscriber initialized");
}

/// Single dispatch loop: stdin commands and timer firings are handled one
/// at a time against the same form.
async fn run(cfg: configs::AppConfig) -> anyhow::Result<()> {
    common::env::ensure_data_dir(&cfg.storage.data_dir).await?;
    let local = JsonMapStore::open(cfg.storage.local_storage_path()).await?;
    let session = JsonMapStore::in_memory();
    let (scheduler, mut timers) = TokioScheduler::new();

    let deps = FormDeps {
        presentation: Arc::new(TerminalPresentation::default()),
        notifier: Arc::new(TerminalNotifier),
        scheduler,
        clock: Arc::new(SystemClock),
        local_storage: local,
        session_storage: session,
    };
    let mut form = LoginForm::new(FormSettings::from(&cfg), deps);
    form.handle(FormEvent::PageReady).await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Command::Event(event)) => form.handle(event).await,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Quit) => break,
                    Err(msg) => warn!(event = "bad_command", %msg, "ignored input line"),
                }
            }
            Some(fired) = timers.recv() => form.fire(fired).await,
            _ = tokio::signal::ctrl_c() => {
                info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
                break;
            }
        }
    }
    Ok(())
}

fn main() -> std::process::ExitCode {
    // config first: it decides the log format
    let cfg = configs::AppConfig::load_and_validate();
    let json_logs = cfg.as_ref().map(|c| c.logging.json).unwrap_or(false);
    init_logging(json_logs);
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "login_form", event = "config_invalid", error = %e, "invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let session_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "login_form",
            event = "panic",
            %session_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    // one thread: the form is driven from a single dispatch loop
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "login_form", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "login_form",
        event = "start",
        %session_id,
        pid,
        version,
        data_dir = %cfg.storage.data_dir.display(),
        "login form starting"
    );

    match rt.block_on(run(cfg)) {
        Ok(()) => {
            info!(service = "login_form", event = "stop", %session_id, "login form closed");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "login_form", event = "run_failed", error = %e, "login form exited with error");
            std::process::ExitCode::FAILURE
        }
    }
}
