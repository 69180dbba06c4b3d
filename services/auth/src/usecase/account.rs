use chrono::Utc;

use parcelbox_domain::id::IdentityId;
use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::Role;

use crate::domain::repository::AccountRepository;
use crate::domain::types::{
    Account, Caller, MIN_NAME_LEN, MIN_PASSWORD_LEN, normalize_email, validate_email,
    validate_name,
};
use crate::error::AuthServiceError;
use crate::infra::password::hash_password;

pub struct CreateAccountInput {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

pub struct CreateAccountUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> CreateAccountUseCase<A> {
    /// `caller` is the signed-in user making the request, if any. Only the customer
    /// role is self-service.
    pub async fn execute(
        &self,
        caller: Option<Caller>,
        input: CreateAccountInput,
    ) -> Result<Identity, AuthServiceError> {
        let email = normalize_email(&input.email);
        if !validate_email(&email) {
            return Err(AuthServiceError::InvalidInput("invalid email".into()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthServiceError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let first_name = clean_name(input.first_name)?;
        let last_name = clean_name(input.last_name)?;

        let role = input.role.unwrap_or_default();
        if role != Role::Customer && !caller.is_some_and(|c| c.can_grant(role)) {
            return Err(AuthServiceError::Forbidden);
        }

        let account = Account {
            id: IdentityId::new(),
            email,
            password_hash: hash_password(&input.password)?,
            email_verified: false,
            signup_role: role,
            first_name,
            last_name,
            created_at: Utc::now(),
        };

        if !self.accounts.create(&account).await? {
            return Err(AuthServiceError::AccountAlreadyExists);
        }

        tracing::info!(identity_id = %account.id, role = %role, "account created");
        Ok(account.identity())
    }
}

/// Trim an optional name and reject one that is too short.
pub(crate) fn clean_name(name: Option<String>) -> Result<Option<String>, AuthServiceError> {
    match name {
        None => Ok(None),
        Some(name) if validate_name(&name) => Ok(Some(name.trim().to_owned())),
        Some(_) => Err(AuthServiceError::InvalidInput(format!(
            "names must be at least {MIN_NAME_LEN} characters"
        ))),
    }
}
