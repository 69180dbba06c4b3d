#![allow(async_fn_in_trait)]

use parcelbox_domain::id::{IdentityId, SessionId};
use parcelbox_domain::profile::Profile;

use crate::domain::types::{Account, SessionRecord};
use crate::error::AuthServiceError;

pub trait AccountRepository: Send + Sync {
    /// Insert a new account. Returns `false` if the email is already taken.
    async fn create(&self, account: &Account) -> Result<bool, AuthServiceError>;

    /// Look up by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthServiceError>;

    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Account>, AuthServiceError>;
}

pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &SessionRecord) -> Result<(), AuthServiceError>;

    async fn find_by_id(&self, id: SessionId) -> Result<Option<SessionRecord>, AuthServiceError>;

    /// Delete a session. Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: SessionId) -> Result<bool, AuthServiceError>;
}

pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Profile>, AuthServiceError>;

    /// Insert a new profile. Returns `false` if one already exists for the id.
    async fn create(&self, profile: &Profile) -> Result<bool, AuthServiceError>;

    /// Overwrite names, role, status and `updated_at`.
    async fn update(&self, profile: &Profile) -> Result<(), AuthServiceError>;
}

// ── Borrowed repositories ────────────────────────────────────────────────────
// Lets one use case hand its repositories to another without cloning.

impl<T: AccountRepository> AccountRepository for &T {
    async fn create(&self, account: &Account) -> Result<bool, AuthServiceError> {
        (**self).create(account).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthServiceError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Account>, AuthServiceError> {
        (**self).find_by_id(id).await
    }
}

impl<T: SessionRepository> SessionRepository for &T {
    async fn create(&self, session: &SessionRecord) -> Result<(), AuthServiceError> {
        (**self).create(session).await
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<SessionRecord>, AuthServiceError> {
        (**self).find_by_id(id).await
    }

    async fn delete(&self, id: SessionId) -> Result<bool, AuthServiceError> {
        (**self).delete(id).await
    }
}
