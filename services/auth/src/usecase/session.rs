use chrono::{DateTime, Duration, Utc};

use parcelbox_auth_types::token::{TokenInfo, issue_access_token};
use parcelbox_domain::id::SessionId;
use parcelbox_domain::identity::Identity;

use crate::domain::repository::{AccountRepository, ProfileRepository, SessionRepository};
use crate::domain::types::{Caller, SessionRecord, normalize_email};
use crate::error::AuthServiceError;
use crate::infra::password::verify_password;

// ── SignIn ───────────────────────────────────────────────────────────────────

pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct SignInOutput {
    pub access_token: String,
    /// Seconds since UNIX epoch.
    pub expires_at: u64,
    pub identity: Identity,
}

pub struct SignInUseCase<A: AccountRepository, S: SessionRepository> {
    pub accounts: A,
    pub sessions: S,
    pub jwt_secret: String,
    pub session_ttl_secs: u64,
}

impl<A: AccountRepository, S: SessionRepository> SignInUseCase<A, S> {
    pub async fn execute(&self, input: SignInInput) -> Result<SignInOutput, AuthServiceError> {
        // Unknown email and wrong password are indistinguishable to the caller.
        let account = self
            .accounts
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;
        if !verify_password(&input.password, &account.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let now = Utc::now();
        let ttl = i64::try_from(self.session_ttl_secs).unwrap_or(i64::MAX);
        let expires: DateTime<Utc> = now + Duration::seconds(ttl);
        let session = SessionRecord {
            id: SessionId::new(),
            identity_id: account.id,
            expires_at: expires,
            created_at: now,
        };
        self.sessions.create(&session).await?;

        let expires_at = u64::try_from(expires.timestamp()).unwrap_or_default();
        let access_token = issue_access_token(account.id, session.id, expires_at, &self.jwt_secret)
            .map_err(|e| AuthServiceError::Internal(anyhow::Error::new(e).context("issue access token")))?;

        tracing::info!(identity_id = %account.id, session_id = %session.id, "signed in");
        Ok(SignInOutput {
            access_token,
            expires_at,
            identity: account.identity(),
        })
    }
}

// ── CurrentSession ───────────────────────────────────────────────────────────

pub struct CurrentSessionUseCase<A: AccountRepository, S: SessionRepository> {
    pub accounts: A,
    pub sessions: S,
}

impl<A: AccountRepository, S: SessionRepository> CurrentSessionUseCase<A, S> {
    /// Identity behind a validated token, provided its session row is still live.
    pub async fn execute(&self, token: TokenInfo) -> Result<Identity, AuthServiceError> {
        let session = self
            .sessions
            .find_by_id(token.session_id)
            .await?
            .ok_or(AuthServiceError::InvalidSession)?;
        if session.identity_id != token.identity_id || !session.is_live(Utc::now()) {
            return Err(AuthServiceError::InvalidSession);
        }

        let account = self
            .accounts
            .find_by_id(session.identity_id)
            .await?
            .ok_or(AuthServiceError::InvalidSession)?;
        Ok(account.identity())
    }
}

// ── SignOut ──────────────────────────────────────────────────────────────────

pub struct SignOutUseCase<S: SessionRepository> {
    pub sessions: S,
}

impl<S: SessionRepository> SignOutUseCase<S> {
    pub async fn execute(&self, token: TokenInfo) -> Result<(), AuthServiceError> {
        if !self.sessions.delete(token.session_id).await? {
            return Err(AuthServiceError::InvalidSession);
        }
        tracing::info!(identity_id = %token.identity_id, session_id = %token.session_id, "signed out");
        Ok(())
    }
}

// ── ResolveCaller ────────────────────────────────────────────────────────────

pub struct ResolveCallerUseCase<A: AccountRepository, S: SessionRepository, P: ProfileRepository> {
    pub accounts: A,
    pub sessions: S,
    pub profiles: P,
}

impl<A, S, P> ResolveCallerUseCase<A, S, P>
where
    A: AccountRepository,
    S: SessionRepository,
    P: ProfileRepository,
{
    /// Check the session behind `token` and attach the caller's current role.
    pub async fn execute(&self, token: TokenInfo) -> Result<Caller, AuthServiceError> {
        let current = CurrentSessionUseCase {
            accounts: &self.accounts,
            sessions: &self.sessions,
        };
        let identity = current.execute(token).await?;
        let role = self
            .profiles
            .find_by_id(identity.id)
            .await?
            .filter(|p| p.is_active())
            .map(|p| p.role);
        Ok(Caller {
            identity_id: identity.id,
            role,
        })
    }
}
