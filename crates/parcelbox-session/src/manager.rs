//! The session store.
//!
//! One [`SessionManager`] per host owns the published [`SessionState`]. Readers get a
//! [`watch::Receiver`] through [`SessionManager::subscribe`]; user-visible conditions go
//! out on a separate broadcast channel of [`SessionNotice`]s.

use std::future;

use chrono::Utc;
use parcelbox_domain::id::IdentityId;
use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::{Profile, ProfileStatus, ProfileUpdate, Role};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::notice::SessionNotice;
use crate::port::{
    AuthBackend, AuthChange, NewAccount, PortError, ProfileChange, ProfileStore, Subscription,
};
use crate::state::{Session, SessionState};

const NOTICE_CAPACITY: usize = 32;

/// Optional attributes recorded at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpAttributes {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Defaults to [`Role::Customer`].
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpOutcome {
    pub identity: Identity,
    /// The account exists but its email address is not confirmed yet.
    pub verification_required: bool,
}

/// Notification subscriptions taken by [`SessionManager::init`].
///
/// Hand it to [`SessionManager::run`]. Dropping it (or the `run` future) unsubscribes.
#[derive(Debug)]
pub struct SessionListener {
    auth: Subscription<AuthChange>,
    watching: Option<IdentityId>,
    profile: Option<Subscription<ProfileChange>>,
}

impl SessionListener {
    /// Unsubscribe from every stream.
    pub fn close(mut self) {
        self.auth.close();
        if let Some(mut profile) = self.profile.take() {
            profile.close();
        }
    }
}

enum Event {
    Auth(AuthChange),
    Profile(ProfileChange),
    ProfileClosed,
}

pub struct SessionManager<B, P> {
    backend: B,
    profiles: P,
    state: watch::Sender<SessionState>,
    notices: broadcast::Sender<SessionNotice>,
    /// Identity signed out for an inactive account, until the next `SignedOut` arrives.
    forced_out: watch::Sender<Option<IdentityId>>,
}

impl<B, P> SessionManager<B, P> {
    pub fn new(backend: B, profiles: P) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let (forced_out, _) = watch::channel(None);
        Self {
            backend,
            profiles,
            state,
            notices,
            forced_out,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn profiles(&self) -> &P {
        &self.profiles
    }

    fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().session().map(|s| s.identity.clone())
    }

    fn current_identity_id(&self) -> Option<IdentityId> {
        self.state.borrow().identity_id()
    }

    /// Publish `next` unless it equals the current state.
    fn publish(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            debug!(from = current.label(), to = next.label(), "session state changed");
            *current = next;
            true
        });
    }

    /// Swap the profile of the current session if it still belongs to `profile.id`.
    fn replace_profile(&self, profile: Profile) {
        self.state.send_if_modified(|current| match current {
            SessionState::Authenticated(session) if session.identity.id == profile.id => {
                if session.profile.as_ref() == Some(&profile) {
                    return false;
                }
                debug!(identity_id = %profile.id, role = %profile.role, "session profile replaced");
                session.profile = Some(profile);
                true
            }
            _ => false,
        });
    }

    fn notify(&self, notice: SessionNotice) {
        // No receivers is fine.
        let _ = self.notices.send(notice);
    }
}

impl<B: AuthBackend, P: ProfileStore> SessionManager<B, P> {
    /// Resolve the stored session and subscribe to backend notifications.
    pub async fn init(&self) -> SessionListener {
        self.publish(SessionState::Loading);
        let auth = self.backend.on_session_change();

        match self.backend.get_session().await {
            Ok(Some(identity)) => {
                if let Err(e) = self.establish(identity).await {
                    debug!(error = %e, "stored session dropped");
                }
            }
            Ok(None) => self.publish(SessionState::Anonymous),
            Err(e) => {
                warn!(error = %e, "failed to read current session, starting anonymous");
                self.publish(SessionState::Anonymous);
            }
        }

        let mut listener = SessionListener {
            auth,
            watching: None,
            profile: None,
        };
        self.sync_profile_watch(&mut listener).await;
        listener
    }

    /// Apply notifications in arrival order until the auth stream closes.
    pub async fn run(&self, mut listener: SessionListener) {
        self.sync_profile_watch(&mut listener).await;
        loop {
            let event = tokio::select! {
                change = listener.auth.recv() => match change {
                    Some(change) => Event::Auth(change),
                    None => break,
                },
                change = next_profile_change(&mut listener.profile) => match change {
                    Some(change) => Event::Profile(change),
                    None => Event::ProfileClosed,
                },
            };

            match event {
                Event::Auth(change) => self.apply(change).await,
                Event::Profile(change) => self.apply_profile_change(change).await,
                Event::ProfileClosed => {
                    debug!(identity_id = ?listener.watching, "profile change stream closed");
                    listener.profile = None;
                }
            }
            self.sync_profile_watch(&mut listener).await;
        }
        debug!("session change stream closed");
    }

    /// Apply one auth notification. Applying the same notification twice is harmless.
    pub async fn apply(&self, change: AuthChange) {
        match change {
            AuthChange::SignedIn(identity) | AuthChange::UserUpdated(identity) => {
                if *self.forced_out.borrow() == Some(identity.id) {
                    debug!(identity_id = %identity.id, "skipping notification queued before forced sign-out");
                    return;
                }
                if self.current_identity_id() != Some(identity.id) {
                    self.publish(SessionState::Loading);
                }
                if let Err(e) = self.establish(identity).await {
                    debug!(error = %e, "notified session dropped");
                }
            }
            AuthChange::SignedOut => {
                self.forced_out.send_replace(None);
                self.publish(SessionState::Anonymous);
            }
        }
    }

    /// Apply one profile notification for the signed-in identity.
    pub async fn apply_profile_change(&self, change: ProfileChange) {
        let ProfileChange::Updated(profile) = change;
        if self.current_identity_id() != Some(profile.id) {
            return;
        }
        if !profile.is_active() {
            self.force_sign_out(profile.id, profile.status).await;
            return;
        }
        self.replace_profile(profile);
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: SignUpAttributes,
    ) -> Result<SignUpOutcome, SessionError> {
        let account = NewAccount {
            email: email.trim().to_owned(),
            password: password.to_owned(),
            first_name: attributes.first_name,
            last_name: attributes.last_name,
            role: attributes.role.unwrap_or_default(),
        };

        let identity = match self.backend.create_account(&account).await {
            Ok(identity) => identity,
            Err(PortError::DuplicateAccount) => {
                self.notify(SessionNotice::DuplicateAccount);
                return Err(SessionError::DuplicateAccount);
            }
            Err(e) => return Err(e.into()),
        };

        let verification_required = !identity.email_verified;
        if verification_required {
            self.notify(SessionNotice::VerificationRequired);
        }
        debug!(identity_id = %identity.id, role = %account.role, "account created");
        Ok(SignUpOutcome {
            identity,
            verification_required,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let identity = match self.backend.authenticate(email.trim(), password).await {
            Ok(identity) => identity,
            Err(PortError::InvalidCredentials) => {
                self.notify(SessionNotice::InvalidCredentials);
                return Err(SessionError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        self.forced_out.send_replace(None);
        self.publish(SessionState::Loading);
        let session = self.establish(identity).await?;
        self.notify(SessionNotice::SignedIn);
        Ok(session)
    }

    /// Always ends `Anonymous`. A failed termination is logged, not returned.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        if let Err(e) = self.backend.terminate_session().await {
            warn!(error = %e, "session termination failed, clearing local session anyway");
        }
        self.publish(SessionState::Anonymous);
        self.notify(SessionNotice::SignedOut);
        Ok(())
    }

    /// Read the profile for `identity`, creating it on first access.
    ///
    /// A profile that is not active signs the session out and yields
    /// [`SessionError::AccountInactive`].
    pub async fn fetch_profile(&self, identity: &Identity) -> Result<Profile, SessionError> {
        let profile = match self.profiles.select(identity.id).await? {
            Some(profile) => profile,
            None => self.create_profile(identity).await?,
        };

        if !profile.is_active() {
            self.force_sign_out(identity.id, profile.status).await;
            return Err(SessionError::AccountInactive);
        }
        Ok(profile)
    }

    /// Update the signed-in user's own profile and republish the session.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile, SessionError> {
        let identity = self.current_identity().ok_or(SessionError::NotSignedIn)?;
        let profile = self.profiles.update(identity.id, &update).await?;

        if !profile.is_active() {
            self.force_sign_out(identity.id, profile.status).await;
            return Err(SessionError::AccountInactive);
        }
        self.replace_profile(profile.clone());
        self.notify(SessionNotice::ProfileUpdated);
        Ok(profile)
    }

    async fn create_profile(&self, identity: &Identity) -> Result<Profile, SessionError> {
        let fresh = Profile::first_access(identity, Role::default(), Utc::now());
        match self.profiles.insert(&fresh).await {
            Ok(profile) => {
                debug!(identity_id = %profile.id, role = %profile.role, "profile created on first access");
                Ok(profile)
            }
            // Lost a race with another first access.
            Err(PortError::AlreadyExists) => self
                .profiles
                .select(identity.id)
                .await?
                .ok_or_else(|| SessionError::Backend(anyhow::anyhow!("profile missing after insert conflict"))),
            Err(e) => Err(e.into()),
        }
    }

    /// Publish `identity` with its profile. A transient profile failure keeps the
    /// identity with no profile attached.
    async fn establish(&self, identity: Identity) -> Result<Session, SessionError> {
        let profile = match self.fetch_profile(&identity).await {
            Ok(profile) => Some(profile),
            Err(SessionError::AccountInactive) => return Err(SessionError::AccountInactive),
            Err(e) => {
                warn!(identity_id = %identity.id, error = %e, "profile unavailable, continuing without it");
                None
            }
        };

        let session = Session { identity, profile };
        self.publish(SessionState::Authenticated(session.clone()));
        Ok(session)
    }

    async fn force_sign_out(&self, id: IdentityId, status: ProfileStatus) {
        warn!(identity_id = %id, %status, "account not active, signing out");
        self.forced_out.send_replace(Some(id));
        if let Err(e) = self.backend.terminate_session().await {
            warn!(error = %e, "session termination failed during forced sign-out");
        }
        self.publish(SessionState::Anonymous);
        self.notify(SessionNotice::AccountInactive);
    }

    /// Point the profile subscription at the signed-in identity, if it changed.
    async fn sync_profile_watch(&self, listener: &mut SessionListener) {
        let wanted = self.current_identity_id();
        if listener.watching == wanted {
            return;
        }
        listener.profile = None;
        listener.watching = wanted;

        if let Some(id) = wanted {
            match self.profiles.watch(id).await {
                Ok(subscription) => listener.profile = Some(subscription),
                Err(e) => warn!(identity_id = %id, error = %e, "profile change stream unavailable"),
            }
        }
    }
}

async fn next_profile_change(
    profile: &mut Option<Subscription<ProfileChange>>,
) -> Option<ProfileChange> {
    match profile {
        Some(subscription) => subscription.recv().await,
        None => future::pending().await,
    }
}
