use parcelbox_domain::id::IdentityId;
use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::{Profile, Role};
use serde::Serialize;

/// Signed-in identity plus its profile, when one could be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub identity: Identity,
    pub profile: Option<Profile>,
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }
}

/// What the session store currently knows.
///
/// `Unknown` before `init`, `Loading` while a session is being resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "session", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unknown,
    Loading,
    Authenticated(Session),
    Anonymous,
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn identity_id(&self) -> Option<IdentityId> {
        self.session().map(|s| s.identity.id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Loading => "loading",
            Self::Authenticated(_) => "authenticated",
            Self::Anonymous => "anonymous",
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Anonymous)
    }
}
