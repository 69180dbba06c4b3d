use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};

use parcelbox_auth_schema::{accounts, profiles, sessions};
use parcelbox_domain::id::{IdentityId, SessionId};
use parcelbox_domain::profile::Profile;

use crate::domain::repository::{AccountRepository, ProfileRepository, SessionRepository};
use crate::domain::types::{Account, SessionRecord};
use crate::error::AuthServiceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── Account repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn create(&self, account: &Account) -> Result<bool, AuthServiceError> {
        let result = accounts::ActiveModel {
            id: Set(account.id.0),
            email: Set(account.email.clone()),
            password_hash: Set(account.password_hash.clone()),
            email_verified: Set(account.email_verified),
            signup_role: Set(account.signup_role.as_str().to_owned()),
            first_name: Set(account.first_name.clone()),
            last_name: Set(account.last_name.clone()),
            created_at: Set(account.created_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("create account").into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthServiceError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find account by email")?;
        Ok(model.map(account_from_model).transpose()?)
    }

    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Account>, AuthServiceError> {
        let model = accounts::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find account by id")?;
        Ok(model.map(account_from_model).transpose()?)
    }
}

fn account_from_model(model: accounts::Model) -> anyhow::Result<Account> {
    Ok(Account {
        id: IdentityId(model.id),
        signup_role: model.signup_role.parse().context("stored signup role")?,
        email: model.email,
        password_hash: model.password_hash,
        email_verified: model.email_verified,
        first_name: model.first_name,
        last_name: model.last_name,
        created_at: model.created_at,
    })
}

// ── Session repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

impl SessionRepository for DbSessionRepository {
    async fn create(&self, session: &SessionRecord) -> Result<(), AuthServiceError> {
        sessions::ActiveModel {
            id: Set(session.id.0),
            account_id: Set(session.identity_id.0),
            expires_at: Set(session.expires_at),
            created_at: Set(session.created_at),
        }
        .insert(&self.db)
        .await
        .context("create session")?;
        Ok(())
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<SessionRecord>, AuthServiceError> {
        let model = sessions::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find session")?;
        Ok(model.map(|m| SessionRecord {
            id: SessionId(m.id),
            identity_id: IdentityId(m.account_id),
            expires_at: m.expires_at,
            created_at: m.created_at,
        }))
    }

    async fn delete(&self, id: SessionId) -> Result<bool, AuthServiceError> {
        let result = sessions::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .context("delete session")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Profile repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProfileRepository {
    pub db: DatabaseConnection,
}

impl ProfileRepository for DbProfileRepository {
    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Profile>, AuthServiceError> {
        let model = profiles::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find profile")?;
        Ok(model.map(profile_from_model).transpose()?)
    }

    async fn create(&self, profile: &Profile) -> Result<bool, AuthServiceError> {
        let result = profiles::ActiveModel {
            id: Set(profile.id.0),
            email: Set(profile.email.clone()),
            role: Set(profile.role.as_str().to_owned()),
            first_name: Set(profile.first_name.clone()),
            last_name: Set(profile.last_name.clone()),
            status: Set(profile.status.as_str().to_owned()),
            created_at: Set(profile.created_at),
            updated_at: Set(profile.updated_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(true),
            // Primary key collision: the profile already exists.
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("create profile").into()),
        }
    }

    async fn update(&self, profile: &Profile) -> Result<(), AuthServiceError> {
        profiles::ActiveModel {
            id: Set(profile.id.0),
            role: Set(profile.role.as_str().to_owned()),
            first_name: Set(profile.first_name.clone()),
            last_name: Set(profile.last_name.clone()),
            status: Set(profile.status.as_str().to_owned()),
            updated_at: Set(profile.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update profile")?;
        Ok(())
    }
}

fn profile_from_model(model: profiles::Model) -> anyhow::Result<Profile> {
    Ok(Profile {
        id: IdentityId(model.id),
        role: model.role.parse().context("stored profile role")?,
        status: model.status.parse().context("stored profile status")?,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
