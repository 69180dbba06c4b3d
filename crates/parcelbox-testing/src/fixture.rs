//! Domain fixtures.

use chrono::Utc;
use parcelbox_domain::id::IdentityId;
use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::{Profile, ProfileStatus, Role};

/// Verified identity with a fresh id.
pub fn test_identity(email: &str) -> Identity {
    Identity {
        id: IdentityId::new(),
        email: email.to_owned(),
        email_verified: true,
    }
}

/// Active profile for `identity` with the given role.
pub fn test_profile(identity: &Identity, role: Role) -> Profile {
    Profile::first_access(identity, role, Utc::now())
}

/// Profile with a non-default status.
pub fn test_profile_with_status(identity: &Identity, role: Role, status: ProfileStatus) -> Profile {
    Profile {
        status,
        ..test_profile(identity, role)
    }
}
