//! Client-side session core.
//!
//! [`manager::SessionManager`] is the single writer of "who is signed in and what can
//! they do"; [`guard::RouteGuard`] reads the published [`state::SessionState`] and
//! redirects pages the session may not stay on. Both talk to the account backend only
//! through the traits in [`port`].

pub mod config;
pub mod error;
pub mod guard;
pub mod infra;
pub mod manager;
pub mod notice;
pub mod port;
pub mod state;

pub use guard::{GuardDecision, Navigator, RouteGuard};
pub use manager::{SessionListener, SessionManager, SignUpAttributes, SignUpOutcome};
pub use state::{Session, SessionState};
