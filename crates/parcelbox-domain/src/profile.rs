//! Profile domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::IdentityId;
use crate::identity::Identity;

/// Account role.
///
/// Wire format: snake_case string (`"super_admin"`, `"customer"`, ...).
/// Roles are flat: no role inherits another's access. Screen access is decided
/// through [`crate::capability`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    LocationAdmin,
    LocationStaff,
    CustomerService,
    #[default]
    Customer,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::LocationAdmin,
        Role::LocationStaff,
        Role::CustomerService,
        Role::Customer,
    ];

    /// Roles that land on the admin dashboard.
    pub const ADMIN: [Role; 3] = [Role::SuperAdmin, Role::Admin, Role::LocationAdmin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::LocationAdmin => "location_admin",
            Self::LocationStaff => "location_staff",
            Self::CustomerService => "customer_service",
            Self::Customer => "customer",
        }
    }

    pub fn is_admin(self) -> bool {
        Self::ADMIN.contains(&self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role or status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "role",
                value: s.to_owned(),
            })
    }
}

/// Account standing. Only `Active` accounts may hold a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Active,
    Inactive,
    Suspended,
}

impl ProfileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(ParseEnumError {
                kind: "status",
                value: s.to_owned(),
            }),
        }
    }
}

/// Application-owned record of role, name and status, keyed by identity id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: IdentityId,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Profile created lazily on first authenticated access.
    pub fn first_access(identity: &Identity, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            role,
            first_name: None,
            last_name: None,
            status: ProfileStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProfileStatus::Active
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &ProfileUpdate, now: DateTime<Utc>) {
        if let Some(ref first_name) = update.first_name {
            self.first_name = Some(first_name.clone());
        }
        if let Some(ref last_name) = update.last_name {
            self.last_name = Some(last_name.clone());
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProfileStatus>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }

    /// Whether the update touches fields only an administrator may change.
    pub fn is_privileged(&self) -> bool {
        self.role.is_some() || self.status.is_some()
    }
}
