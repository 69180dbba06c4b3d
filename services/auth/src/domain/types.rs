use chrono::{DateTime, Utc};

use parcelbox_domain::id::{IdentityId, SessionId};
use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::Role;

/// Password account owned by the account service.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: IdentityId,
    /// Lower-cased, trimmed.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub email_verified: bool,
    pub signup_role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            email_verified: self.email_verified,
        }
    }
}

/// Server-side record behind an access token.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    pub identity_id: IdentityId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Authenticated caller of a profile endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub identity_id: IdentityId,
    /// `None` until the caller's profile exists.
    pub role: Option<Role>,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(Role::is_admin)
    }

    /// Own profile, or any profile for an administrator.
    pub fn can_access(&self, id: IdentityId) -> bool {
        self.identity_id == id || self.is_admin()
    }

    /// Whether this caller may hand out `role`: an administrator whose own capabilities
    /// cover the granted role's. Only a super admin grants super admin.
    pub fn can_grant(&self, role: Role) -> bool {
        match role {
            Role::Customer => true,
            Role::SuperAdmin => self.role == Some(Role::SuperAdmin),
            _ => self.role.is_some_and(|own| own.is_admin() && own.covers(role)),
        }
    }
}

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum length of a first or last name, when given.
pub const MIN_NAME_LEN: usize = 2;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose shape check: `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

pub fn validate_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LEN
}
