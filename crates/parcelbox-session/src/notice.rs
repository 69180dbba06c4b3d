use serde::Serialize;

/// User-visible condition raised by the session store.
///
/// Published on a broadcast channel; a lagging or absent listener never blocks the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionNotice {
    VerificationRequired,
    SignedIn,
    SignedOut,
    AccountInactive,
    InvalidCredentials,
    DuplicateAccount,
    ProfileUpdated,
}

impl SessionNotice {
    pub fn message(self) -> &'static str {
        match self {
            Self::VerificationRequired => "Check your email to confirm your account.",
            Self::SignedIn => "Signed in.",
            Self::SignedOut => "Signed out.",
            Self::AccountInactive => "Your account is inactive. Please contact support.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::DuplicateAccount => "An account with this email already exists.",
            Self::ProfileUpdated => "Profile updated.",
        }
    }
}
