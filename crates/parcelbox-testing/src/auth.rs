//! Mock session credentials for integration tests.
//!
//! `MockAuth` signs a real access token with the test secret, so requests pass the
//! `SessionClaims` extractor without going through sign-in. The session id it carries
//! must still be live in the session repository for handlers that check revocation.

use axum::http::{HeaderMap, HeaderValue, header};
use parcelbox_auth_types::cookie::PARCELBOX_SESSION;
use parcelbox_auth_types::token::issue_access_token;
use parcelbox_domain::id::{IdentityId, SessionId};

/// Secret the test routers are configured with.
pub const TEST_SECRET: &str = "parcelbox-test-secret";

/// One hour from now, in UNIX seconds.
pub fn expires_in_an_hour() -> u64 {
    (chrono::Utc::now().timestamp() + 3600) as u64
}

/// Signed identity injected into test requests.
#[derive(Debug, Clone, Copy)]
pub struct MockAuth {
    pub identity_id: IdentityId,
    pub session_id: SessionId,
    pub expires_at: u64,
}

impl MockAuth {
    pub fn new(identity_id: IdentityId, session_id: SessionId) -> Self {
        Self {
            identity_id,
            session_id,
            expires_at: expires_in_an_hour(),
        }
    }

    /// Token already past its expiry (beyond validation leeway).
    pub fn expired(identity_id: IdentityId, session_id: SessionId) -> Self {
        Self {
            identity_id,
            session_id,
            expires_at: (chrono::Utc::now().timestamp() - 3600) as u64,
        }
    }

    pub fn token(&self) -> String {
        issue_access_token(self.identity_id, self.session_id, self.expires_at, TEST_SECRET)
            .expect("test token must encode")
    }

    pub fn bearer(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token())).expect("valid header value")
    }

    pub fn cookie(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("{PARCELBOX_SESSION}={}", self.token()))
            .expect("valid header value")
    }

    /// `Authorization: Bearer` headers.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, self.bearer());
        map
    }
}
