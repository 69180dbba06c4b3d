use chrono::Utc;

use parcelbox_domain::id::IdentityId;
use parcelbox_domain::profile::{Profile, ProfileUpdate};

use crate::domain::repository::{AccountRepository, ProfileRepository};
use crate::domain::types::Caller;
use crate::error::AuthServiceError;
use crate::usecase::account::clean_name;

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<P: ProfileRepository> {
    pub profiles: P,
}

impl<P: ProfileRepository> GetProfileUseCase<P> {
    pub async fn execute(&self, caller: Caller, id: IdentityId) -> Result<Profile, AuthServiceError> {
        if !caller.can_access(id) {
            return Err(AuthServiceError::Forbidden);
        }
        self.profiles
            .find_by_id(id)
            .await?
            .ok_or(AuthServiceError::ProfileNotFound)
    }
}

// ── CreateProfile ────────────────────────────────────────────────────────────

pub struct CreateProfileInput {
    pub id: IdentityId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct CreateProfileUseCase<A: AccountRepository, P: ProfileRepository> {
    pub accounts: A,
    pub profiles: P,
}

impl<A: AccountRepository, P: ProfileRepository> CreateProfileUseCase<A, P> {
    /// Create the caller's own profile on first access. The role is the one recorded at
    /// sign-up, whatever the client asks for.
    pub async fn execute(
        &self,
        caller: Caller,
        input: CreateProfileInput,
    ) -> Result<Profile, AuthServiceError> {
        if caller.identity_id != input.id {
            return Err(AuthServiceError::Forbidden);
        }
        let account = self
            .accounts
            .find_by_id(input.id)
            .await?
            .ok_or(AuthServiceError::InvalidSession)?;

        let mut profile = Profile::first_access(&account.identity(), account.signup_role, Utc::now());
        profile.first_name = clean_name(input.first_name)?.or(account.first_name);
        profile.last_name = clean_name(input.last_name)?.or(account.last_name);

        if !self.profiles.create(&profile).await? {
            return Err(AuthServiceError::ProfileAlreadyExists);
        }

        tracing::info!(identity_id = %profile.id, role = %profile.role, "profile created");
        Ok(profile)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileUseCase<P: ProfileRepository> {
    pub profiles: P,
}

impl<P: ProfileRepository> UpdateProfileUseCase<P> {
    pub async fn execute(
        &self,
        caller: Caller,
        id: IdentityId,
        update: ProfileUpdate,
    ) -> Result<Profile, AuthServiceError> {
        if update.is_empty() {
            return Err(AuthServiceError::InvalidInput("nothing to update".into()));
        }
        if !caller.can_access(id) {
            return Err(AuthServiceError::Forbidden);
        }
        if update.is_privileged() && (!caller.is_admin() || caller.identity_id == id) {
            return Err(AuthServiceError::Forbidden);
        }
        if update.role.is_some_and(|role| !caller.can_grant(role)) {
            return Err(AuthServiceError::Forbidden);
        }

        let update = ProfileUpdate {
            first_name: clean_name(update.first_name)?,
            last_name: clean_name(update.last_name)?,
            ..update
        };

        let mut profile = self
            .profiles
            .find_by_id(id)
            .await?
            .ok_or(AuthServiceError::ProfileNotFound)?;

        // The target's current role must be one the caller could grant.
        if update.is_privileged() && !caller.can_grant(profile.role) {
            return Err(AuthServiceError::Forbidden);
        }

        profile.apply(&update, Utc::now());
        self.profiles.update(&profile).await?;

        tracing::info!(
            identity_id = %profile.id,
            updated_by = %caller.identity_id,
            role = %profile.role,
            status = %profile.status,
            "profile updated"
        );
        Ok(profile)
    }
}
