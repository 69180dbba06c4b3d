use anyhow::Result;
use serde_json::{Value, json};

use parcelbox_domain::capability::{Dashboard, Screen};
use parcelbox_domain::profile::Role;
use parcelbox_session::error::SessionError;
use parcelbox_session::port::{AuthBackend, ProfileStore};
use parcelbox_session::{RouteGuard, SessionManager, SignUpAttributes};

pub enum Command {
    SignUp {
        email: String,
        password: String,
        first_name: Option<String>,
        last_name: Option<String>,
        role: Option<Role>,
    },
    SignIn {
        email: String,
        password: String,
        target: GuardTarget,
        /// Account created first; only meaningful against an empty in-process backend.
        seed_role: Option<Role>,
    },
    Whoami {
        target: GuardTarget,
    },
}

/// Page the guard is evaluated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardTarget {
    Screen(Screen),
    Page(String),
}

impl GuardTarget {
    /// A screen wins over a page name; with neither, any signed-in page.
    pub fn from_args(screen: Option<Screen>, page: Option<String>) -> Self {
        match (screen, page) {
            (Some(screen), _) => Self::Screen(screen),
            (None, Some(page)) => Self::Page(page),
            (None, None) => Self::Page(parcelbox_domain::page::DASHBOARD.to_owned()),
        }
    }

    fn guard(&self) -> RouteGuard {
        match self {
            Self::Screen(screen) => RouteGuard::for_screen(*screen),
            Self::Page(_) => RouteGuard::authenticated(),
        }
    }

    fn label(&self) -> Value {
        match self {
            Self::Screen(screen) => json!({ "screen": screen }),
            Self::Page(page) => json!({ "page": page }),
        }
    }
}

/// Run one command and describe the outcome.
///
/// Expected session failures (bad credentials, duplicate or inactive account) are part
/// of the report rather than errors.
pub async fn execute<B, P>(
    manager: &SessionManager<B, P>,
    command: Command,
    offline: bool,
) -> Result<Value>
where
    B: AuthBackend,
    P: ProfileStore,
{
    let listener = manager.init().await;

    let report = match command {
        Command::SignUp {
            email,
            password,
            first_name,
            last_name,
            role,
        } => {
            let attributes = SignUpAttributes {
                first_name,
                last_name,
                role,
            };
            match manager.sign_up(&email, &password, attributes).await {
                Ok(outcome) => json!({ "sign_up": outcome }),
                Err(e) => failure(e)?,
            }
        }
        Command::SignIn {
            email,
            password,
            target,
            seed_role,
        } => {
            if offline {
                let attributes = SignUpAttributes {
                    role: seed_role,
                    ..Default::default()
                };
                manager.sign_up(&email, &password, attributes).await?;
            } else if seed_role.is_some() {
                tracing::warn!("--role only seeds offline accounts, ignoring it");
            }
            match manager.sign_in(&email, &password).await {
                Ok(_) => guarded(manager, &target),
                Err(e) => {
                    let mut report = failure(e)?;
                    report["guard"] = guard_report(manager, &target);
                    report
                }
            }
        }
        Command::Whoami { target } => guarded(manager, &target),
    };

    listener.close();
    Ok(report)
}

fn guarded<B, P>(manager: &SessionManager<B, P>, target: &GuardTarget) -> Value {
    let state = manager.state();
    let dashboard = state.session().and_then(|s| s.role()).map(Dashboard::for_role);
    json!({
        "session": state,
        "settled": state.is_settled(),
        "dashboard": dashboard,
        "guard": guard_report(manager, target),
    })
}

fn guard_report<B, P>(manager: &SessionManager<B, P>, target: &GuardTarget) -> Value {
    let decision = target.guard().decide(&manager.state());
    json!({
        "target": target.label(),
        "result": decision,
    })
}

/// Report a session failure, or pass a backend failure up.
fn failure(error: SessionError) -> Result<Value> {
    match error {
        SessionError::Backend(e) => Err(e.context("account service call failed")),
        other => Ok(json!({
            "error": { "kind": other.kind(), "message": other.to_string() },
        })),
    }
}
