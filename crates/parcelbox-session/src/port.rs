//! Seams between the session core and the account backend.
//!
//! The session core only ever talks to these two traits. Both have an in-process
//! implementation ([`crate::infra::memory`]) and an HTTP one ([`crate::infra::http`]).
#![allow(async_fn_in_trait)]

use parcelbox_domain::id::IdentityId;
use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::{Profile, ProfileUpdate, Role};
use tokio::sync::mpsc;

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account already exists")]
    DuplicateAccount,
    #[error("profile already exists")]
    AlreadyExists,
    #[error("no live session")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("backend unavailable")]
    Unavailable(#[source] anyhow::Error),
}

// ── Notifications ───────────────────────────────────────────────────────────

/// Session change reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthChange {
    SignedIn(Identity),
    SignedOut,
    UserUpdated(Identity),
}

/// Row-level change of one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileChange {
    Updated(Profile),
}

/// Ordered stream of notifications. Dropping it unsubscribes.
///
/// Producers keep the matching [`mpsc::UnboundedSender`] and prune it once
/// [`mpsc::UnboundedSender::is_closed`] reports the subscriber gone.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    pub fn channel() -> (mpsc::UnboundedSender<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Next event, or `None` once every producer is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Stop receiving. Events already queued are still returned by [`Self::recv`].
    pub fn close(&mut self) {
        self.rx.close();
    }
}

// ── Ports ───────────────────────────────────────────────────────────────────

/// Attributes sent when creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

pub trait AuthBackend {
    async fn create_account(&self, account: &NewAccount) -> Result<Identity, PortError>;
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, PortError>;
    async fn terminate_session(&self) -> Result<(), PortError>;
    async fn get_session(&self) -> Result<Option<Identity>, PortError>;
    fn on_session_change(&self) -> Subscription<AuthChange>;
}

pub trait ProfileStore {
    async fn select(&self, id: IdentityId) -> Result<Option<Profile>, PortError>;
    async fn insert(&self, profile: &Profile) -> Result<Profile, PortError>;
    async fn update(&self, id: IdentityId, update: &ProfileUpdate) -> Result<Profile, PortError>;
    async fn watch(&self, id: IdentityId) -> Result<Subscription<ProfileChange>, PortError>;
}

/// Send `event` to every live subscriber and drop the ones that went away.
pub(crate) fn fan_out<T: Clone>(subscribers: &mut Vec<mpsc::UnboundedSender<T>>, event: &T) {
    subscribers.retain(|tx| tx.send(event.clone()).is_ok());
}
