//! Page access decisions over the published session.

use parcelbox_domain::capability::Screen;
use parcelbox_domain::page;
use parcelbox_domain::profile::Role;
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::state::SessionState;

/// Outcome of checking a session against a page's allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "page", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session still resolving; render nothing and do not redirect.
    Wait,
    Allow,
    Redirect(&'static str),
}

/// Host navigation callback.
pub trait Navigator {
    fn navigate(&self, page: &str);
}

impl<F: Fn(&str)> Navigator for F {
    fn navigate(&self, page: &str) {
        self(page)
    }
}

/// Guards one page. An empty allow-list only requires a signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    required_roles: Vec<Role>,
    last_redirect: Option<&'static str>,
}

impl RouteGuard {
    pub fn new(required_roles: impl Into<Vec<Role>>) -> Self {
        Self {
            required_roles: required_roles.into(),
            last_redirect: None,
        }
    }

    pub fn for_screen(screen: Screen) -> Self {
        Self::new(screen.allowed_roles())
    }

    pub fn authenticated() -> Self {
        Self::new(Vec::new())
    }

    pub fn required_roles(&self) -> &[Role] {
        &self.required_roles
    }

    pub fn decide(&self, state: &SessionState) -> GuardDecision {
        let session = match state {
            SessionState::Unknown | SessionState::Loading => return GuardDecision::Wait,
            SessionState::Anonymous => return GuardDecision::Redirect(page::HOME),
            SessionState::Authenticated(session) => session,
        };

        if self.required_roles.is_empty() {
            return GuardDecision::Allow;
        }
        match session.role() {
            // Without a profile the role is unknown; protected pages treat that as signed out.
            None => GuardDecision::Redirect(page::HOME),
            Some(role) if self.required_roles.contains(&role) => GuardDecision::Allow,
            Some(_) => GuardDecision::Redirect(page::DASHBOARD),
        }
    }

    /// Decide and navigate. The same redirect is issued once until the decision changes.
    pub fn observe<N: Navigator + ?Sized>(
        &mut self,
        state: &SessionState,
        navigator: &N,
    ) -> GuardDecision {
        let decision = self.decide(state);
        match decision {
            GuardDecision::Redirect(target) => {
                if self.last_redirect != Some(target) {
                    debug!(page = target, state = state.label(), "guard redirect");
                    navigator.navigate(target);
                    self.last_redirect = Some(target);
                }
            }
            GuardDecision::Allow => self.last_redirect = None,
            // Waiting never resets; Loading between two Anonymous states is the same transition.
            GuardDecision::Wait => {}
        }
        decision
    }

    /// Observe the current state and every change until the sender is dropped.
    pub async fn watch<N: Navigator>(mut self, mut states: watch::Receiver<SessionState>, navigator: N) {
        loop {
            let state = states.borrow_and_update().clone();
            self.observe(&state, &navigator);
            if states.changed().await.is_err() {
                break;
            }
        }
    }
}
