//! In-process account backend for offline runs and tests.
//!
//! Passwords are kept in plain text; this is a stand-in, never a store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use parcelbox_domain::id::IdentityId;
use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::{Profile, ProfileStatus, ProfileUpdate, Role};
use tokio::sync::mpsc;

use crate::port::{
    AuthBackend, AuthChange, NewAccount, PortError, ProfileChange, ProfileStore, Subscription,
    fan_out,
};

struct Account {
    identity: Identity,
    password: String,
    signup_role: Role,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    profiles: HashMap<IdentityId, Profile>,
    current: Option<IdentityId>,
    auth_subscribers: Vec<mpsc::UnboundedSender<AuthChange>>,
    profile_subscribers: HashMap<IdentityId, Vec<mpsc::UnboundedSender<ProfileChange>>>,
    fail_next_terminate: bool,
    fail_profile_reads: bool,
}

impl Inner {
    fn identity(&self, id: IdentityId) -> Option<&Identity> {
        self.accounts
            .values()
            .map(|a| &a.identity)
            .find(|identity| identity.id == id)
    }

    fn publish_profile(&mut self, profile: &Profile) {
        if let Some(subscribers) = self.profile_subscribers.get_mut(&profile.id) {
            fan_out(subscribers, &ProfileChange::Updated(profile.clone()));
        }
    }
}

/// Implements both [`AuthBackend`] and [`ProfileStore`]. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change a profile's status and notify its watchers.
    pub fn set_status(&self, id: IdentityId, status: ProfileStatus) {
        self.modify_profile(id, |profile| profile.status = status);
    }

    /// Change a profile's role and notify its watchers.
    pub fn set_role(&self, id: IdentityId, role: Role) {
        self.modify_profile(id, |profile| profile.role = role);
    }

    /// Make the next `terminate_session` call fail. The session is still ended locally.
    pub fn fail_next_terminate(&self) {
        self.lock().fail_next_terminate = true;
    }

    /// Make profile reads fail until switched off.
    pub fn fail_profile_reads(&self, fail: bool) {
        self.lock().fail_profile_reads = fail;
    }

    /// Mark an account's email as confirmed and notify session subscribers.
    pub fn confirm_email(&self, id: IdentityId) {
        let mut inner = self.lock();
        let Some(account) = inner.accounts.values_mut().find(|a| a.identity.id == id) else {
            return;
        };
        account.identity.email_verified = true;
        let identity = account.identity.clone();
        fan_out(&mut inner.auth_subscribers, &AuthChange::UserUpdated(identity));
    }

    /// Deliver `change` to session subscribers as if another client caused it.
    pub fn emit(&self, change: AuthChange) {
        let mut inner = self.lock();
        inner.current = match &change {
            AuthChange::SignedIn(identity) | AuthChange::UserUpdated(identity) => Some(identity.id),
            AuthChange::SignedOut => None,
        };
        fan_out(&mut inner.auth_subscribers, &change);
    }

    /// Seed or overwrite a profile row without notifying anyone.
    pub fn put_profile(&self, profile: Profile) {
        self.lock().profiles.insert(profile.id, profile);
    }

    pub fn profile(&self, id: IdentityId) -> Option<Profile> {
        self.lock().profiles.get(&id).cloned()
    }

    /// Live session subscribers. Dropped subscriptions are pruned first.
    pub fn session_subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.auth_subscribers.retain(|tx| !tx.is_closed());
        inner.auth_subscribers.len()
    }

    /// Live watchers of one profile. Dropped subscriptions are pruned first.
    pub fn profile_watcher_count(&self, id: IdentityId) -> usize {
        let mut inner = self.lock();
        let Some(watchers) = inner.profile_subscribers.get_mut(&id) else {
            return 0;
        };
        watchers.retain(|tx| !tx.is_closed());
        watchers.len()
    }

    pub fn profile_count(&self) -> usize {
        self.lock().profiles.len()
    }

    fn modify_profile(&self, id: IdentityId, change: impl FnOnce(&mut Profile)) {
        let mut inner = self.lock();
        let Some(profile) = inner.profiles.get_mut(&id) else {
            return;
        };
        change(profile);
        profile.updated_at = Utc::now();
        let profile = profile.clone();
        inner.publish_profile(&profile);
    }
}

impl AuthBackend for MemoryBackend {
    async fn create_account(&self, account: &NewAccount) -> Result<Identity, PortError> {
        let email = normalize_email(&account.email);
        let mut inner = self.lock();
        if inner.accounts.contains_key(&email) {
            return Err(PortError::DuplicateAccount);
        }

        let identity = Identity {
            id: IdentityId::new(),
            email: email.clone(),
            email_verified: false,
        };
        inner.accounts.insert(
            email,
            Account {
                identity: identity.clone(),
                password: account.password.clone(),
                signup_role: account.role,
            },
        );
        Ok(identity)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, PortError> {
        let mut inner = self.lock();
        let identity = match inner.accounts.get(&normalize_email(email)) {
            Some(account) if account.password == password => account.identity.clone(),
            _ => return Err(PortError::InvalidCredentials),
        };
        inner.current = Some(identity.id);
        fan_out(&mut inner.auth_subscribers, &AuthChange::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn terminate_session(&self) -> Result<(), PortError> {
        let mut inner = self.lock();
        let failed = std::mem::take(&mut inner.fail_next_terminate);
        inner.current = None;
        fan_out(&mut inner.auth_subscribers, &AuthChange::SignedOut);
        if failed {
            return Err(PortError::Unavailable(anyhow::anyhow!("terminate failed")));
        }
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Identity>, PortError> {
        let inner = self.lock();
        Ok(inner.current.and_then(|id| inner.identity(id).cloned()))
    }

    fn on_session_change(&self) -> Subscription<AuthChange> {
        let (tx, subscription) = Subscription::channel();
        self.lock().auth_subscribers.push(tx);
        subscription
    }
}

impl ProfileStore for MemoryBackend {
    async fn select(&self, id: IdentityId) -> Result<Option<Profile>, PortError> {
        let inner = self.lock();
        if inner.fail_profile_reads {
            return Err(PortError::Unavailable(anyhow::anyhow!("profile reads disabled")));
        }
        Ok(inner.profiles.get(&id).cloned())
    }

    async fn insert(&self, profile: &Profile) -> Result<Profile, PortError> {
        let mut inner = self.lock();
        if inner.profiles.contains_key(&profile.id) {
            return Err(PortError::AlreadyExists);
        }

        let mut row = profile.clone();
        // The role chosen at sign-up wins over whatever the caller proposes.
        if let Some(account) = inner.accounts.values().find(|a| a.identity.id == profile.id) {
            row.role = account.signup_role;
        }
        inner.profiles.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: IdentityId, update: &ProfileUpdate) -> Result<Profile, PortError> {
        let mut inner = self.lock();
        let profile = inner.profiles.get_mut(&id).ok_or(PortError::NotFound)?;
        profile.apply(update, Utc::now());
        let profile = profile.clone();
        inner.publish_profile(&profile);
        Ok(profile)
    }

    async fn watch(&self, id: IdentityId) -> Result<Subscription<ProfileChange>, PortError> {
        let (tx, subscription) = Subscription::channel();
        self.lock().profile_subscribers.entry(id).or_default().push(tx);
        Ok(subscription)
    }
}
