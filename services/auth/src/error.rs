use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use parcelbox_auth_types::wire::kind;

/// Account service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("session expired")]
    InvalidSession,
    #[error("account already exists")]
    AccountAlreadyExists,
    #[error("profile not found")]
    ProfileNotFound,
    #[error("profile already exists")]
    ProfileAlreadyExists,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => kind::INVALID_INPUT,
            Self::InvalidCredentials => kind::INVALID_CREDENTIALS,
            Self::InvalidSession => kind::INVALID_SESSION,
            Self::AccountAlreadyExists => kind::ACCOUNT_ALREADY_EXISTS,
            Self::ProfileNotFound => kind::PROFILE_NOT_FOUND,
            Self::ProfileAlreadyExists => kind::PROFILE_ALREADY_EXISTS,
            Self::Forbidden => kind::FORBIDDEN,
            Self::Internal(_) => kind::INTERNAL,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::InvalidSession => StatusCode::UNAUTHORIZED,
            Self::AccountAlreadyExists | Self::ProfileAlreadyExists => StatusCode::CONFLICT,
            Self::ProfileNotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer records every response; only server-side faults are logged here,
        // with the anyhow chain so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = kind::INTERNAL, "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
