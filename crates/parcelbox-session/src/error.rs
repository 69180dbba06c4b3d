use crate::port::PortError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    DuplicateAccount,
    #[error("account is not active")]
    AccountInactive,
    #[error("not signed in")]
    NotSignedIn,
    #[error("not allowed")]
    Forbidden,
    #[error("account backend failed")]
    Backend(#[source] anyhow::Error),
}

impl SessionError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::DuplicateAccount => "DUPLICATE_ACCOUNT",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::NotSignedIn => "NOT_SIGNED_IN",
            Self::Forbidden => "FORBIDDEN",
            Self::Backend(_) => "BACKEND",
        }
    }
}

impl From<PortError> for SessionError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::InvalidCredentials => Self::InvalidCredentials,
            PortError::DuplicateAccount => Self::DuplicateAccount,
            PortError::Unauthorized => Self::NotSignedIn,
            PortError::Forbidden => Self::Forbidden,
            PortError::Unavailable(e) => Self::Backend(e),
            other @ (PortError::AlreadyExists | PortError::NotFound) => {
                Self::Backend(anyhow::Error::new(other))
            }
        }
    }
}
