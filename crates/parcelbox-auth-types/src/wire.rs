//! JSON bodies of the account API, shared by the service and its HTTP client.

use serde::{Deserialize, Serialize};

use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::Role;

/// `POST /auth/accounts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// `POST /auth/session`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    /// Token expiry, seconds since UNIX epoch.
    pub expires_at: u64,
    pub identity: Identity,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// `kind` values clients branch on.
pub mod kind {
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const INVALID_SESSION: &str = "INVALID_SESSION";
    pub const ACCOUNT_ALREADY_EXISTS: &str = "ACCOUNT_ALREADY_EXISTS";
    pub const PROFILE_NOT_FOUND: &str = "PROFILE_NOT_FOUND";
    pub const PROFILE_ALREADY_EXISTS: &str = "PROFILE_ALREADY_EXISTS";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const INTERNAL: &str = "INTERNAL";
}

/// SSE event name carrying a profile snapshot on `GET /profiles/{id}/events`.
pub const PROFILE_CHANGED_EVENT: &str = "profile_changed";
